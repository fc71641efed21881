use std::sync::Arc;
use std::time::Duration;

use filesponge_core::{
    FileActor, FileTransport, FilespongeError, FilespongeResult, SignalKind, WorkerConfig,
};
use futures::future::join_all;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::signal_worker::{SignalWorker, WorkerStats};

/// Worker服务构建器
pub struct WorkerServiceBuilder {
    transport: Arc<dyn FileTransport>,
    actors: Vec<Arc<dyn FileActor>>,
    poll_timeout: Duration,
    loops_per_kind: usize,
    shutdown_timeout: Duration,
}

impl WorkerServiceBuilder {
    /// 创建新的构建器
    pub fn new(transport: Arc<dyn FileTransport>) -> Self {
        let defaults = WorkerConfig::default();
        Self {
            transport,
            actors: Vec::new(),
            poll_timeout: defaults.poll_timeout(),
            loops_per_kind: defaults.loops_per_kind,
            shutdown_timeout: defaults.shutdown_timeout(),
        }
    }

    /// 应用配置中的轮询参数
    pub fn with_config(self, config: &WorkerConfig) -> Self {
        self.poll_timeout(config.poll_timeout())
            .loops_per_kind(config.loops_per_kind)
            .shutdown_timeout(config.shutdown_timeout())
    }

    /// 设置单次轮询的最长等待时间
    pub fn poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// 设置每个Actor每类信号的轮询循环数
    pub fn loops_per_kind(mut self, loops_per_kind: usize) -> Self {
        self.loops_per_kind = loops_per_kind;
        self
    }

    /// 设置停止时等待循环退出的时间
    pub fn shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// 注册需要轮询的Actor
    pub fn actor(mut self, actor: Arc<dyn FileActor>) -> Self {
        info!("注册轮询Actor: {}", actor.name());
        self.actors.push(actor);
        self
    }

    pub fn actors<I>(self, actors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn FileActor>>,
    {
        actors.into_iter().fold(self, Self::actor)
    }

    /// 构建WorkerService
    pub fn build(self) -> FilespongeResult<WorkerService> {
        if self.loops_per_kind == 0 {
            return Err(FilespongeError::config_error("loops_per_kind 必须大于0"));
        }
        if self.poll_timeout.is_zero() {
            return Err(FilespongeError::config_error("poll_timeout 必须大于0"));
        }

        Ok(WorkerService {
            transport: self.transport,
            actors: self.actors,
            poll_timeout: self.poll_timeout,
            loops_per_kind: self.loops_per_kind,
            shutdown_timeout: self.shutdown_timeout,
            running: Mutex::new(None),
        })
    }
}

struct RunningLoops {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<WorkerStats>>,
}

/// 驱动所有Actor轮询循环的服务
///
/// `start` 为每个Actor的每类信号启动 `loops_per_kind` 个 [`SignalWorker`]；
/// `stop` 广播停止信号并在限定时间内等待循环退出，超时的循环被中止。
pub struct WorkerService {
    transport: Arc<dyn FileTransport>,
    actors: Vec<Arc<dyn FileActor>>,
    poll_timeout: Duration,
    loops_per_kind: usize,
    shutdown_timeout: Duration,
    running: Mutex<Option<RunningLoops>>,
}

impl WorkerService {
    /// 创建构建器
    pub fn builder(transport: Arc<dyn FileTransport>) -> WorkerServiceBuilder {
        WorkerServiceBuilder::new(transport)
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// 运行中的轮询循环数
    pub async fn loop_count(&self) -> usize {
        self.running
            .lock()
            .await
            .as_ref()
            .map_or(0, |running| running.handles.len())
    }

    /// 启动Worker服务
    pub async fn start(&self) -> FilespongeResult<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(FilespongeError::Internal("Worker服务已在运行".to_string()));
        }

        info!(
            "启动Worker服务: actors={}, 每类循环数={}, 轮询超时={:?}, transport={}",
            self.actors.len(),
            self.loops_per_kind,
            self.poll_timeout,
            self.transport.name()
        );

        let (shutdown_tx, _) = broadcast::channel(1);
        let mut handles = Vec::new();

        for actor in &self.actors {
            for kind in SignalKind::ALL {
                for index in 0..self.loops_per_kind {
                    let worker = SignalWorker::new(
                        Arc::clone(actor),
                        kind,
                        Arc::clone(&self.transport),
                        self.poll_timeout,
                        index,
                    );
                    handles.push(tokio::spawn(worker.run(shutdown_tx.subscribe())));
                }
            }
        }

        info!("Worker服务启动成功: {} 个轮询循环", handles.len());
        *running = Some(RunningLoops {
            shutdown_tx,
            handles,
        });
        Ok(())
    }

    /// 停止Worker服务，返回所有循环的汇总统计
    pub async fn stop(&self) -> FilespongeResult<WorkerStats> {
        let Some(RunningLoops {
            shutdown_tx,
            mut handles,
        }) = self.running.lock().await.take()
        else {
            return Ok(WorkerStats::default());
        };

        info!("停止Worker服务: 等待 {} 个轮询循环退出", handles.len());

        // 没有接收者时发送失败，说明循环都已退出
        let _ = shutdown_tx.send(());

        let joined =
            tokio::time::timeout(self.shutdown_timeout, join_all(handles.iter_mut())).await;

        let results = match joined {
            Ok(results) => results,
            Err(_) => {
                warn!(
                    "等待轮询循环退出超时 ({:?})，中止剩余循环",
                    self.shutdown_timeout
                );
                for handle in &handles {
                    handle.abort();
                }
                return Err(FilespongeError::Internal(format!(
                    "轮询循环未能在 {:?} 内退出",
                    self.shutdown_timeout
                )));
            }
        };

        let mut total = WorkerStats::default();
        for result in results {
            match result {
                Ok(stats) => total = total.merge(stats),
                Err(e) => error!("轮询循环异常退出: {}", e),
            }
        }

        info!(
            "Worker服务已停止: 成功={}, 失败={}",
            total.delivered, total.failed
        );
        Ok(total)
    }
}
