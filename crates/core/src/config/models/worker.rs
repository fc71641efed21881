use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// 单次轮询的最长等待时间（毫秒）
    pub poll_timeout_ms: u64,
    /// 每个Actor每种信号类型启动的轮询循环数
    pub loops_per_kind: usize,
    /// 关闭时等待Worker退出的最长时间（秒）
    pub shutdown_timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 1000,
            loops_per_kind: 1,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl WorkerConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_timeout_ms == 0 {
            return Err(anyhow::anyhow!("轮询超时时间必须大于0"));
        }

        if self.loops_per_kind == 0 {
            return Err(anyhow::anyhow!("每种信号的轮询循环数必须大于0"));
        }

        if self.shutdown_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("关闭超时时间必须大于0"));
        }

        Ok(())
    }
}
