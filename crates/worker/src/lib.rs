pub mod service;
pub mod signal_worker;
pub mod transport;

pub use service::{WorkerService, WorkerServiceBuilder};
pub use signal_worker::{SignalWorker, WorkerStats};
pub use transport::LoggingTransport;
