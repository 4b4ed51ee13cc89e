//! 数据模型模块

mod alert;
mod common;
mod reading;
mod report;
mod threshold;

pub use alert::*;
pub use common::*;
pub use reading::*;
pub use report::*;
pub use threshold::*;
