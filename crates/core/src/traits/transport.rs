use async_trait::async_trait;
use filesponge_errors::FilespongeResult;

use crate::models::{PendingSignal, SignalKind};

/// 实际执行下载/删除I/O的传输层
///
/// 由具体镜像后端提供，信号层只负责把取出的信号交给它。
#[async_trait]
pub trait FileTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn download(&self, signal: &PendingSignal) -> FilespongeResult<()>;

    async fn delete(&self, signal: &PendingSignal) -> FilespongeResult<()>;

    async fn execute(&self, signal: &PendingSignal) -> FilespongeResult<()> {
        match signal.kind() {
            SignalKind::Download => self.download(signal).await,
            SignalKind::Delete => self.delete(signal).await,
        }
    }
}
