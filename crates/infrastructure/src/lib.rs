pub mod mirror_actor;
pub mod signal_queue;

pub use mirror_actor::*;
pub use signal_queue::*;
