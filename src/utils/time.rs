//! 时间处理工具

use chrono::{DateTime, Duration, Utc};
use std::future::Future;

use crate::errors::AppError;

/// 获取 N 天前的时间
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

/// 获取 N 小时前的时间
pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

/// 格式化为 ISO 8601（毫秒精度，UTC）
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// 在截止时间内等待存储操作，超时返回 `AppError::Timeout`
pub async fn with_deadline<T, F>(limit: std::time::Duration, operation: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{} 超过 {} 秒未完成",
            operation,
            limit.as_secs()
        ))),
    }
}
