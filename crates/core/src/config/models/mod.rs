pub mod actor;
pub mod app_config;
pub mod observability;
pub mod worker;

pub use actor::ActorConfig;
pub use app_config::AppConfig;
pub use observability::ObservabilityConfig;
pub use worker::WorkerConfig;
