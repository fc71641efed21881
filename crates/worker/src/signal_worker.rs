use std::sync::Arc;
use std::time::Duration;

use filesponge_core::{FileActor, FileTransport, Outcome, PendingSignal, Rejection, SignalKind};
use metrics::counter;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// 单个轮询循环的处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub delivered: u64,
    pub failed: u64,
}

impl WorkerStats {
    pub fn merge(self, other: WorkerStats) -> WorkerStats {
        WorkerStats {
            delivered: self.delivered + other.delivered,
            failed: self.failed + other.failed,
        }
    }
}

/// 绑定到某个Actor某类信号的轮询循环
///
/// 循环在有限超时内等待信号，取到后交给传输层执行。Actor关闭或收到停止广播时退出。
pub struct SignalWorker {
    actor: Arc<dyn FileActor>,
    kind: SignalKind,
    transport: Arc<dyn FileTransport>,
    poll_timeout: Duration,
    label: String,
}

impl SignalWorker {
    pub fn new(
        actor: Arc<dyn FileActor>,
        kind: SignalKind,
        transport: Arc<dyn FileTransport>,
        poll_timeout: Duration,
        index: usize,
    ) -> Self {
        let label = format!("{}/{}#{}", actor.name(), kind, index);
        Self {
            actor,
            kind,
            transport,
            poll_timeout,
            label,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// 运行轮询循环直到Actor关闭或收到停止信号
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        debug!("轮询循环启动: {}", self.label);

        loop {
            // 等待中的取出操作可以安全地被停止信号打断
            let outcome = tokio::select! {
                outcome = self.actor.poll_next(self.kind, self.poll_timeout) => outcome,
                _ = shutdown_rx.recv() => {
                    info!("轮询循环收到停止信号: {}", self.label);
                    break;
                }
            };

            match outcome {
                Outcome::Accepted(signal) => {
                    if self.deliver(&signal).await {
                        stats.delivered += 1;
                    } else {
                        stats.failed += 1;
                    }
                }
                Outcome::NoValue => continue,
                Outcome::Rejected(Rejection::QueueClosed) => {
                    info!("Actor队列已关闭，轮询循环退出: {}", self.label);
                    break;
                }
                Outcome::Rejected(reason) => {
                    warn!("轮询返回意外结果 {}，循环退出: {}", reason, self.label);
                    break;
                }
            }
        }

        info!(
            "轮询循环已停止: {}, 成功={}, 失败={}",
            self.label, stats.delivered, stats.failed
        );
        stats
    }

    /// 把信号交给传输层，失败只记录，不重试
    async fn deliver(&self, signal: &PendingSignal) -> bool {
        match self.transport.execute(signal).await {
            Ok(()) => {
                debug!(
                    worker = %self.label,
                    locator = %signal.locator(),
                    transport = self.transport.name(),
                    "Signal delivered"
                );
                true
            }
            Err(e) => {
                warn!(
                    "传输执行失败: worker={}, locator={}, 可重试={}, error={}",
                    self.label,
                    signal.locator(),
                    e.is_retryable(),
                    e
                );
                counter!(
                    "filesponge_transport_failures_total",
                    "actor" => signal.actor.clone(),
                    "kind" => self.kind.as_str()
                )
                .increment(1);
                false
            }
        }
    }
}
