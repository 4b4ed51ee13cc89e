//! HTTP 处理器模块

mod alert_handler;
mod health_handler;
mod reading_handler;
mod report_handler;
mod threshold_handler;

pub use alert_handler::*;
pub use health_handler::*;
pub use reading_handler::*;
pub use report_handler::*;
pub use threshold_handler::*;
