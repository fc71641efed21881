//! Actor能力接口定义
//!
//! 每个镜像/协议后端实现一次 [`FileActor`]：
//! - `can_handle` 能力探测，无副作用、幂等、快速，每次路由都会调用
//! - `download_file` / `delete_file` 向Actor自己的信号队列提交信号
//! - `download_next` / `delete_next` 供Worker循环带超时地取出下一个信号
//!
//! 探测逻辑可插拔，由 [`CapabilityProbe`] 表达，闭包可直接作为探测器使用。

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::models::{Delivery, Locator, Outcome, PendingSignal, SignalKind};

/// 提交确认的接收端，信号被消费或取消时完成
pub type DeliveryReceiver = oneshot::Receiver<Delivery>;

/// 能力探测器
pub trait CapabilityProbe: Send + Sync {
    fn accepts(&self, locator: &Locator) -> bool;

    fn describe(&self) -> String {
        "custom".to_string()
    }
}

impl<F> CapabilityProbe for F
where
    F: Fn(&Locator) -> bool + Send + Sync,
{
    fn accepts(&self, locator: &Locator) -> bool {
        self(locator)
    }
}

/// 向镜像发送信号的Actor
#[async_trait]
pub trait FileActor: Send + Sync {
    /// Actor名称，在注册表内唯一
    fn name(&self) -> &str;

    /// 该Actor是否能为此定位符发送信号
    fn can_handle(&self, locator: &Locator) -> bool;

    /// 发送"下载文件"信号。重复提交视为已接受；只有队列关闭时返回拒绝。
    fn download_file(&self, locator: &Locator) -> Outcome;

    /// 发送"删除文件"信号，语义同 `download_file`
    fn delete_file(&self, locator: &Locator) -> Outcome;

    /// 发送"下载文件"信号，并在信号被消费或取消时得到通知
    fn download_file_confirmed(&self, locator: &Locator) -> Outcome<DeliveryReceiver>;

    /// 发送"删除文件"信号，并在信号被消费或取消时得到通知
    fn delete_file_confirmed(&self, locator: &Locator) -> Outcome<DeliveryReceiver>;

    /// 取出下一个下载请求
    ///
    /// `timeout` 为0时立即返回；否则等待直到出现请求或超时。
    /// 没有待处理请求时返回 `NoValue`，队列关闭时返回拒绝。
    async fn download_next(&self, timeout: Duration) -> Outcome<PendingSignal>;

    /// 取出下一个删除请求，语义同 `download_next`
    async fn delete_next(&self, timeout: Duration) -> Outcome<PendingSignal>;

    /// 取消尚未被消费的信号
    fn cancel(&self, kind: SignalKind, locator: &Locator) -> bool;

    /// 关闭Actor的所有队列并唤醒等待中的Worker
    fn close(&self);

    fn submit(&self, kind: SignalKind, locator: &Locator) -> Outcome {
        match kind {
            SignalKind::Download => self.download_file(locator),
            SignalKind::Delete => self.delete_file(locator),
        }
    }

    fn submit_confirmed(&self, kind: SignalKind, locator: &Locator) -> Outcome<DeliveryReceiver> {
        match kind {
            SignalKind::Download => self.download_file_confirmed(locator),
            SignalKind::Delete => self.delete_file_confirmed(locator),
        }
    }

    async fn poll_next(&self, kind: SignalKind, timeout: Duration) -> Outcome<PendingSignal> {
        match kind {
            SignalKind::Download => self.download_next(timeout).await,
            SignalKind::Delete => self.delete_next(timeout).await,
        }
    }
}
