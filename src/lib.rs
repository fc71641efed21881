pub mod app;
pub mod shutdown;

pub use app::{parse_request_line, spawn_line_reader, Application, IntakeStats};
pub use shutdown::ShutdownManager;
