use std::io::{BufReader, Cursor, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use filesponge::{spawn_line_reader, Application, IntakeStats, ShutdownManager};
use filesponge_core::{AppConfig, Locator, Rejection, SignalKind};
use tempfile::NamedTempFile;

/// 像交互式终端一样永远阻塞在读取上
struct StalledInput;

impl Read for StalledInput {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            std::thread::park();
        }
    }
}

const CONFIG: &str = r#"
[worker]
poll_timeout_ms = 20
shutdown_timeout_seconds = 2

[[actors]]
name = "archive"
priority = 0
prefixes = ["https://archive.example.org/"]

[[actors]]
name = "cdn"
priority = 1
prefixes = ["https://"]
"#;

fn application() -> Application {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let config = AppConfig::load(file.path().to_str()).unwrap();
    Application::new(config).unwrap()
}

#[tokio::test]
async fn test_intake_routes_lines_to_actors() {
    let app = application();
    assert_eq!(app.config().worker.poll_timeout_ms, 20);

    let input = b"\
# nightly sync
download https://archive.example.org/a.iso

delete https://cdn.example.org/old.iso
download https://archive.example.org/a.iso
fetch https://cdn.example.org/x
download ftp://legacy.example.org/file
";
    let lines = spawn_line_reader(Cursor::new(input.to_vec()));
    let stats = app.process_requests(lines).await;
    assert_eq!(
        stats,
        IntakeStats {
            accepted: 3,
            rejected: 1,
            malformed: 1,
        }
    );

    let archive = app
        .dispatcher()
        .route(&Locator::new("https://archive.example.org/a.iso"))
        .unwrap();
    assert_eq!(archive.name(), "archive");
    let signal = archive
        .download_next(Duration::ZERO)
        .await
        .accepted()
        .unwrap();
    assert_eq!(signal.coalesced, 2);
    assert!(archive.download_next(Duration::ZERO).await.is_no_value());

    let cdn = app.dispatcher().registry().get("cdn").unwrap();
    let signal = cdn.delete_next(Duration::ZERO).await.accepted().unwrap();
    assert_eq!(signal.kind(), SignalKind::Delete);
    assert_eq!(signal.locator().as_str(), "https://cdn.example.org/old.iso");
}

#[tokio::test]
async fn test_shutdown_closes_actors() {
    let app = application();
    app.shutdown().await.unwrap();

    let outcome = app
        .dispatcher()
        .request_download(&Locator::new("https://cdn.example.org/late.iso"));
    assert_eq!(outcome.rejection(), Some(Rejection::QueueClosed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_completes_while_input_is_blocked() {
    let app = Arc::new(application());
    let shutdown_manager = ShutdownManager::new();

    let handle = {
        let app = Arc::clone(&app);
        let lines = spawn_line_reader(BufReader::new(StalledInput));
        let shutdown_rx = shutdown_manager.subscribe();
        tokio::spawn(async move { app.run_with_input(lines, shutdown_rx).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_manager.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("shutdown should not wait for blocked input")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(
        app.dispatcher()
            .request_delete(&Locator::new("https://cdn.example.org/after"))
            .rejection(),
        Some(Rejection::QueueClosed)
    );
}
