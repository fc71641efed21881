use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Locator;

/// 信号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Download,
    Delete,
}

impl SignalKind {
    pub const ALL: [SignalKind; 2] = [SignalKind::Download, SignalKind::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Download => "download",
            SignalKind::Delete => "delete",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 针对单个定位符的下载或删除请求，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub locator: Locator,
    pub kind: SignalKind,
}

impl Signal {
    pub fn new(locator: Locator, kind: SignalKind) -> Self {
        Self { locator, kind }
    }

    pub fn download(locator: Locator) -> Self {
        Self::new(locator, SignalKind::Download)
    }

    pub fn delete(locator: Locator) -> Self {
        Self::new(locator, SignalKind::Delete)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.locator)
    }
}

/// Worker从队列中取出的信号
#[derive(Debug, Clone)]
pub struct PendingSignal {
    pub signal: Signal,
    /// 持有该信号的Actor名称
    pub actor: String,
    /// 首次提交时间
    pub submitted_at: DateTime<Utc>,
    /// 被合并进该条目的提交次数（至少为1）
    pub coalesced: u32,
}

impl PendingSignal {
    pub fn locator(&self) -> &Locator {
        &self.signal.locator
    }

    pub fn kind(&self) -> SignalKind {
        self.signal.kind
    }
}

/// 提交确认的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// 已被某个Actor的Worker取走
    Consumed { actor: String },
    /// 在被消费前被取消（显式取消或队列关闭）
    Cancelled,
}
