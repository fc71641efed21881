//! 信号调度
//!
//! 按优先级顺序探测已注册的Actor，把下载/删除信号提交给第一个接受者。

pub mod dispatcher;
pub mod registry;

#[cfg(test)]
pub mod test_utils;

pub use dispatcher::*;
pub use registry::*;
