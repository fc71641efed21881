use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use filesponge_core::{
    FileActor, FileTransport, FilespongeError, FilespongeResult, Locator, PendingSignal,
    SignalKind, WorkerConfig,
};
use filesponge_infrastructure::MirrorActor;
use filesponge_worker::{WorkerService, WorkerStats};
use tokio::time::{sleep, Instant};

/// 记录所有执行过的信号，定位符包含 "bad" 时返回传输错误
#[derive(Default)]
struct RecordingTransport {
    executed: Mutex<Vec<(SignalKind, Locator)>>,
}

impl RecordingTransport {
    fn executed(&self) -> Vec<(SignalKind, Locator)> {
        self.executed.lock().unwrap().clone()
    }

    fn record(&self, signal: &PendingSignal) -> FilespongeResult<()> {
        self.executed
            .lock()
            .unwrap()
            .push((signal.kind(), signal.locator().clone()));
        if signal.locator().as_str().contains("bad") {
            return Err(FilespongeError::transport("mirror unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl FileTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn download(&self, signal: &PendingSignal) -> FilespongeResult<()> {
        self.record(signal)
    }

    async fn delete(&self, signal: &PendingSignal) -> FilespongeResult<()> {
        self.record(signal)
    }
}

/// 下载时一直挂起的传输层
#[derive(Default)]
struct StuckTransport {
    entered: AtomicBool,
}

#[async_trait]
impl FileTransport for StuckTransport {
    fn name(&self) -> &str {
        "stuck"
    }

    async fn download(&self, _signal: &PendingSignal) -> FilespongeResult<()> {
        self.entered.store(true, Ordering::SeqCst);
        sleep(Duration::from_secs(60)).await;
        Ok(())
    }

    async fn delete(&self, _signal: &PendingSignal) -> FilespongeResult<()> {
        Ok(())
    }
}

fn accept_all(name: &str) -> Arc<MirrorActor> {
    Arc::new(MirrorActor::new(name, |_: &Locator| true))
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_loops_deliver_both_kinds() {
    let transport = Arc::new(RecordingTransport::default());
    let first = accept_all("first");
    let second = accept_all("second");

    let service = WorkerService::builder(transport.clone())
        .actors([
            first.clone() as Arc<dyn FileActor>,
            second.clone() as Arc<dyn FileActor>,
        ])
        .poll_timeout(Duration::from_millis(50))
        .loops_per_kind(2)
        .build()
        .unwrap();

    service.start().await.unwrap();
    assert!(service.is_running().await);
    assert_eq!(service.loop_count().await, 8);

    let download = Locator::new("https://first/file");
    let delete = Locator::new("https://second/file");
    assert!(first.download_file(&download).is_accepted());
    assert!(second.delete_file(&delete).is_accepted());

    wait_until(|| transport.executed().len() == 2).await;
    let executed = transport.executed();
    assert!(executed.contains(&(SignalKind::Download, download)));
    assert!(executed.contains(&(SignalKind::Delete, delete)));

    let stats = service.stop().await.unwrap();
    assert_eq!(
        stats,
        WorkerStats {
            delivered: 2,
            failed: 0
        }
    );
    assert!(!service.is_running().await);
}

#[tokio::test]
async fn test_transport_failure_does_not_stop_loop() {
    let transport = Arc::new(RecordingTransport::default());
    let actor = accept_all("flaky");

    let service = WorkerService::builder(transport.clone())
        .actor(actor.clone())
        .poll_timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    service.start().await.unwrap();

    assert!(actor.download_file(&Locator::new("https://flaky/bad")).is_accepted());
    assert!(actor.download_file(&Locator::new("https://flaky/good")).is_accepted());

    wait_until(|| transport.executed().len() == 2).await;
    let stats = service.stop().await.unwrap();
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_loops_exit_when_actor_closes() {
    let transport = Arc::new(RecordingTransport::default());
    let actor = accept_all("closing");

    let service = WorkerService::builder(transport)
        .actor(actor.clone())
        .poll_timeout(Duration::from_secs(10))
        .shutdown_timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    service.start().await.unwrap();
    sleep(Duration::from_millis(20)).await;

    actor.close();

    let started = Instant::now();
    assert!(service.stop().await.is_ok());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_stop_times_out_on_stuck_transport() {
    let transport = Arc::new(StuckTransport::default());
    let actor = accept_all("stuck");

    let service = WorkerService::builder(transport.clone())
        .actor(actor.clone())
        .poll_timeout(Duration::from_millis(20))
        .shutdown_timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    service.start().await.unwrap();

    assert!(actor.download_file(&Locator::new("https://stuck/iso")).is_accepted());
    wait_until(|| transport.entered.load(Ordering::SeqCst)).await;

    let result = service.stop().await;
    assert!(matches!(result, Err(FilespongeError::Internal(_))));
    assert!(!service.is_running().await);
}

#[tokio::test]
async fn test_start_twice_and_stop_idle() {
    let service = WorkerService::builder(Arc::new(RecordingTransport::default()))
        .actor(accept_all("only"))
        .with_config(&WorkerConfig {
            poll_timeout_ms: 10,
            loops_per_kind: 1,
            shutdown_timeout_seconds: 1,
        })
        .build()
        .unwrap();

    assert_eq!(service.stop().await.unwrap(), WorkerStats::default());

    service.start().await.unwrap();
    assert!(service.start().await.is_err());
    assert_eq!(service.loop_count().await, 2);
    service.stop().await.unwrap();
}

#[test]
fn test_build_rejects_zero_values() {
    let result = WorkerService::builder(Arc::new(RecordingTransport::default()))
        .loops_per_kind(0)
        .build();
    assert!(matches!(result, Err(FilespongeError::Configuration(_))));

    let result = WorkerService::builder(Arc::new(RecordingTransport::default()))
        .poll_timeout(Duration::ZERO)
        .build();
    assert!(matches!(result, Err(FilespongeError::Configuration(_))));
}
