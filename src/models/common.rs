//! 通用数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 统一 API 响应结构
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    /// 创建创建成功响应 (201)
    pub fn created(data: T) -> Self {
        Self {
            code: 201,
            message: "created".to_string(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }
}

/// 时间范围
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// 验证时间范围（闭区间，起止相同也合法）
    pub fn validate(&self, max_days: i64) -> Result<(), String> {
        if self.start > self.end {
            return Err("开始时间不能晚于结束时间".to_string());
        }

        let duration = self.end - self.start;
        if duration.num_days() > max_days {
            return Err(format!("时间范围不能超过 {} 天", max_days));
        }

        Ok(())
    }
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub database: ServiceStatus,
    pub uptime_seconds: u64,
}

/// 服务状态
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: String,
    pub latency_ms: Option<u64>,
}

impl ServiceStatus {
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            status: "healthy".to_string(),
            latency_ms: Some(latency_ms),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            status: "unhealthy".to_string(),
            latency_ms: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
