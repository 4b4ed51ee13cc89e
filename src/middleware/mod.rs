//! 中间件模块

mod logging;

pub use logging::*;
