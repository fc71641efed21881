use async_trait::async_trait;
use filesponge_core::{FileTransport, FilespongeResult, PendingSignal};
use tracing::info;

/// 只记录日志、不做实际I/O的传输层
#[derive(Debug, Clone)]
pub struct LoggingTransport {
    name: String,
}

impl LoggingTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LoggingTransport {
    fn default() -> Self {
        Self::new("logging")
    }
}

#[async_trait]
impl FileTransport for LoggingTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn download(&self, signal: &PendingSignal) -> FilespongeResult<()> {
        info!(
            "[{}] 下载文件: actor={}, locator={}, 合并次数={}",
            self.name,
            signal.actor,
            signal.locator(),
            signal.coalesced
        );
        Ok(())
    }

    async fn delete(&self, signal: &PendingSignal) -> FilespongeResult<()> {
        info!(
            "[{}] 删除文件: actor={}, locator={}",
            self.name,
            signal.actor,
            signal.locator()
        );
        Ok(())
    }
}
