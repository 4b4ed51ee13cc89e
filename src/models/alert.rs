//! 预警模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::ParameterType;

/// 预警级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "alert_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl AlertSeverity {
    /// 严重程度，数值越大越严重
    pub fn rank(&self) -> u8 {
        match self {
            AlertSeverity::Critical => 2,
            AlertSeverity::Warning => 1,
            AlertSeverity::Info => 0,
        }
    }

    /// 已有预警的级别不低于 `other` 时可以覆盖新的越限
    pub fn covers(&self, other: AlertSeverity) -> bool {
        self.rank() >= other.rank()
    }
}

/// 预警状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "alert_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

/// 预警记录
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub sensor_id: Option<Uuid>,
    pub severity: AlertSeverity,
    pub parameter: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub message: String,
    pub status: AlertStatus,
    pub acknowledged_by: Option<Uuid>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 阈值判定结果
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDescriptor {
    pub parameter_type: ParameterType,
    pub severity: AlertSeverity,
    pub current_value: f64,
    /// 被突破的那一侧阈值
    pub threshold_value: f64,
    pub message: String,
}

/// 待写入的预警
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub farm_id: Uuid,
    pub sensor_id: Option<Uuid>,
    pub severity: AlertSeverity,
    pub parameter: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub message: String,
}

impl AlertDescriptor {
    pub fn into_new_alert(self, farm_id: Uuid, sensor_id: Uuid) -> NewAlert {
        NewAlert {
            farm_id,
            sensor_id: Some(sensor_id),
            severity: self.severity,
            parameter: self.parameter_type.label(),
            current_value: self.current_value,
            threshold_value: self.threshold_value,
            message: self.message,
        }
    }
}

/// 更新预警状态请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAlertStatusRequest {
    pub status: AlertStatus,
    pub user_id: Option<Uuid>,
}

/// 状态变更写入的字段，与目标状态不符的字段清空
#[derive(Debug, Clone, PartialEq)]
pub struct AlertStatusChange {
    pub status: AlertStatus,
    pub acknowledged_by: Option<Uuid>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl AlertStatusChange {
    pub fn new(status: AlertStatus, user_id: Option<Uuid>, now: DateTime<Utc>) -> Self {
        let acknowledged = status == AlertStatus::Acknowledged;
        Self {
            status,
            acknowledged_by: if acknowledged { user_id } else { None },
            acknowledged_at: acknowledged.then_some(now),
            resolved_at: (status == AlertStatus::Resolved).then_some(now),
            updated_at: now,
        }
    }

    pub fn apply(&self, alert: &mut Alert) {
        alert.status = self.status;
        alert.acknowledged_by = self.acknowledged_by;
        alert.acknowledged_at = self.acknowledged_at;
        alert.resolved_at = self.resolved_at;
        alert.updated_at = self.updated_at;
    }
}

/// 预警列表查询参数
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AlertListQuery {
    pub farm_id: Option<Uuid>,
    pub status: Option<AlertStatus>,

    #[validate(range(min = 1, max = 100, message = "返回数量应在 1-100 之间"))]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for AlertListQuery {
    fn default() -> Self {
        Self {
            farm_id: None,
            status: None,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> i64 { 100 }

/// 报表使用的预警时间窗口
#[derive(Debug, Clone)]
pub struct AlertWindow {
    pub farm_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub limit: i64,
}
