//! 工具函数模块

mod time;
mod validators;

pub use time::*;
pub use validators::*;
