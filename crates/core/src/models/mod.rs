//! # 数据模型
//!
//! 信号调度层的值类型：定位符、信号、三态结果。
//!
//! ## 核心模型
//!
//! ### Locator - 资源定位符
//! 不透明、可比较、可哈希的远程文件标识，作为队列去重的键。
//!
//! ### Signal - 信号
//! `(Locator, SignalKind)` 二元组，`SignalKind` 只有下载和删除两种。
//!
//! ### Outcome - 三态结果
//! `Accepted` / `Rejected` / `NoValue`，所有操作共享。
//!
//! ## 状态流转
//!
//! ```text
//! Unrequested → Pending(actor, kind) → Consumed
//!      ↓                ↓
//!  Unroutable       Cancelled
//! ```

pub mod locator;
pub mod outcome;
pub mod signal;

pub use locator::*;
pub use outcome::*;
pub use signal::*;
