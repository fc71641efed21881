use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use filesponge_core::{AppConfig, FilespongeError, Locator, Outcome, Signal, SignalKind};
use filesponge_dispatcher::{ActorRegistry, Dispatcher};
use filesponge_worker::{LoggingTransport, WorkerService};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// 标准输入处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeStats {
    pub accepted: usize,
    pub rejected: usize,
    pub malformed: usize,
}

/// 应用实例
pub struct Application {
    config: AppConfig,
    dispatcher: Dispatcher,
    worker_service: WorkerService,
}

impl Application {
    /// 创建新的应用实例
    pub fn new(config: AppConfig) -> Result<Self> {
        let registry = ActorRegistry::from_config(&config).context("创建Actor注册表失败")?;
        info!("已注册 {} 个Actor", registry.len());

        let worker_service = WorkerService::builder(Arc::new(LoggingTransport::default()))
            .with_config(&config.worker)
            .actors(registry.iter().map(|registration| Arc::clone(registration.actor())))
            .build()
            .context("创建Worker服务失败")?;

        Ok(Self {
            config,
            dispatcher: Dispatcher::new(registry),
            worker_service,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// 运行应用，直到收到关闭信号
    ///
    /// 标准输入在独立线程中读取，阻塞的读取不会拖住关闭流程。
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
        self.run_with_input(lines, shutdown_rx).await
    }

    /// 从给定的行通道接收请求，直到收到关闭信号
    ///
    /// 输入结束后继续运行，Worker仍处理已排队的信号。
    pub async fn run_with_input(
        &self,
        lines: mpsc::Receiver<String>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        self.worker_service.start().await?;

        tokio::select! {
            stats = self.process_requests(lines) => {
                info!(
                    "请求输入已结束: 已提交={}, 被拒绝={}, 格式错误={}，等待关闭信号",
                    stats.accepted, stats.rejected, stats.malformed
                );
                let _ = shutdown_rx.recv().await;
            }
            _ = shutdown_rx.recv() => {}
        }

        self.shutdown().await
    }

    /// 关闭所有Actor并停止Worker
    pub async fn shutdown(&self) -> Result<()> {
        info!("关闭所有Actor队列");
        self.dispatcher.registry().close_all();

        let stats = self.worker_service.stop().await?;
        info!(
            "应用已停止: 传输成功={}, 传输失败={}",
            stats.delivered, stats.failed
        );
        Ok(())
    }

    /// 逐行读取请求并提交给调度器
    pub async fn process_requests(&self, mut lines: mpsc::Receiver<String>) -> IntakeStats {
        let mut stats = IntakeStats::default();

        while let Some(line) = lines.recv().await {
            let signal = match parse_request_line(&line) {
                Ok(Some(signal)) => signal,
                Ok(None) => continue,
                Err(e) => {
                    warn!("忽略无法解析的请求行 {:?}: {}", line, e);
                    stats.malformed += 1;
                    continue;
                }
            };

            match self.dispatcher.request(signal.kind, &signal.locator) {
                Outcome::Accepted(ticket) => {
                    info!("已提交{}请求: {} -> {}", ticket.kind, ticket.locator, ticket.actor);
                    stats.accepted += 1;
                }
                Outcome::Rejected(reason) => {
                    warn!("{}请求被拒绝: {} ({})", signal.kind, signal.locator, reason);
                    stats.rejected += 1;
                }
                Outcome::NoValue => {
                    debug!("请求无结果: {}", signal);
                }
            }
        }

        stats
    }
}

/// 在独立线程中逐行读取输入，通过通道交给异步端
///
/// 接收端被丢弃后线程在下一行到达时退出；阻塞在读取上的线程不会阻止进程退出。
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(64);

    let spawned = thread::Builder::new()
        .name("request-intake".to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("读取请求失败: {}", e);
                        break;
                    }
                }
            }
        });

    if let Err(e) = spawned {
        warn!("启动请求读取线程失败: {}", e);
    }

    rx
}

/// 解析一行请求：`download <locator>` 或 `delete <locator>`
///
/// 空行和 `#` 开头的注释返回 `Ok(None)`。
pub fn parse_request_line(line: &str) -> Result<Option<Signal>, FilespongeError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let kind = match parts.next() {
        Some("download") => SignalKind::Download,
        Some("delete") => SignalKind::Delete,
        Some(other) => {
            return Err(FilespongeError::invalid_request(format!("未知的请求类型: {other}")));
        }
        None => return Ok(None),
    };

    let locator = Locator::parse(parts.next().unwrap_or_default())?;
    if let Some(extra) = parts.next() {
        return Err(FilespongeError::invalid_request(format!(
            "{locator} 之后存在多余内容: {extra}"
        )));
    }

    Ok(Some(Signal::new(locator, kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_line() {
        let signal = parse_request_line("download https://mirror/a.iso").unwrap().unwrap();
        assert_eq!(signal.kind, SignalKind::Download);
        assert_eq!(signal.locator.as_str(), "https://mirror/a.iso");

        let signal = parse_request_line("  delete   https://mirror/old  ").unwrap().unwrap();
        assert_eq!(signal.kind, SignalKind::Delete);
        assert_eq!(signal.locator.as_str(), "https://mirror/old");
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert!(parse_request_line("").unwrap().is_none());
        assert!(parse_request_line("   ").unwrap().is_none());
        assert!(parse_request_line("# download https://mirror/a").unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(matches!(
            parse_request_line("fetch https://mirror/a"),
            Err(FilespongeError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_request_line("download"),
            Err(FilespongeError::InvalidLocator(_))
        ));
        assert!(parse_request_line("delete a b").is_err());
    }
}
