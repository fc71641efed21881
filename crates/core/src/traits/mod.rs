pub mod file_actor;
pub mod transport;

pub use file_actor::*;
pub use transport::*;
