//! AquaGuard - 水产养殖水质监测后端服务
//!
//! 接收传感器读数，按养殖户阈值生成预警，并汇总历史读数生成统计报表：
//! - 水质读数上报与查询
//! - 阈值预警（严重 / 警告）与状态流转
//! - 按时间窗口生成 JSON / CSV 报表
//! - 养殖户阈值与通知偏好

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

pub use errors::AppError;
