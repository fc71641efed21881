pub mod config;
pub mod logging;
pub mod models;
pub mod traits;

pub use crate::config::*;
pub use logging::init_logging;
pub use models::*;
pub use traits::*;

pub use filesponge_errors::{FilespongeError, FilespongeResult};
