//! 阈值与通知偏好模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{AlertSeverity, ParameterType};

/// 单个参数的上下限
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThresholdBound {
    pub min: f64,
    pub max: f64,
}

impl ThresholdBound {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// 养殖户的阈值配置，按值传入预警判定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdPreferences {
    pub owner_id: Uuid,
    pub per_parameter: BTreeMap<ParameterType, ThresholdBound>,
}

impl ThresholdPreferences {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            per_parameter: BTreeMap::new(),
        }
    }

    /// 默认阈值：水温 22-26 °C，pH 6.5-7.5，溶解氧 6-10 mg/L，氨氮 0-0.5 ppm
    pub fn defaults(owner_id: Uuid) -> Self {
        Self::new(owner_id)
            .with(ParameterType::Temperature, 22.0, 26.0)
            .with(ParameterType::Ph, 6.5, 7.5)
            .with(ParameterType::DissolvedOxygen, 6.0, 10.0)
            .with(ParameterType::Ammonia, 0.0, 0.5)
    }

    pub fn with(mut self, parameter: ParameterType, min: f64, max: f64) -> Self {
        self.per_parameter
            .insert(parameter, ThresholdBound::new(min, max));
        self
    }

    pub fn bound_for(&self, parameter: ParameterType) -> Option<ThresholdBound> {
        self.per_parameter.get(&parameter).copied()
    }
}

/// 通知偏好
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email_alerts: bool,
    pub sms_alerts: bool,
    pub push_notifications: bool,
    /// 仅推送严重预警
    pub critical_only: bool,
    pub daily_reports: bool,
    pub weekly_reports: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_alerts: true,
            sms_alerts: false,
            push_notifications: true,
            critical_only: false,
            daily_reports: true,
            weekly_reports: false,
        }
    }
}

impl NotificationPreferences {
    pub fn any_channel(&self) -> bool {
        self.email_alerts || self.sms_alerts || self.push_notifications
    }

    /// 判断该级别的预警是否需要通知
    pub fn should_notify(&self, severity: AlertSeverity) -> bool {
        if !self.any_channel() {
            return false;
        }
        !self.critical_only || severity == AlertSeverity::Critical
    }
}

/// 用户偏好（阈值 + 通知）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    pub user_id: Uuid,
    pub notifications: NotificationPreferences,
    pub thresholds: BTreeMap<ParameterType, ThresholdBound>,
    /// 尚未保存过偏好，返回的是默认值
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPreferences {
    pub fn defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            notifications: NotificationPreferences::default(),
            thresholds: ThresholdPreferences::defaults(user_id).per_parameter,
            is_default: true,
            updated_at: None,
        }
    }

    pub fn threshold_preferences(&self) -> ThresholdPreferences {
        ThresholdPreferences {
            owner_id: self.user_id,
            per_parameter: self.thresholds.clone(),
        }
    }
}

/// 整体替换偏好的请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePreferencesRequest {
    #[serde(default)]
    pub notifications: NotificationPreferences,
    pub thresholds: BTreeMap<ParameterType, ThresholdBound>,
}

impl UpdatePreferencesRequest {
    /// 四个受监测参数必须齐全且上下限合法
    pub fn validate_thresholds(&self) -> Result<(), String> {
        for parameter in ParameterType::MONITORED {
            match self.thresholds.get(&parameter) {
                None => return Err(format!("缺少参数 {} 的阈值", parameter)),
                Some(bound) if !bound.is_valid() => {
                    return Err(format!("参数 {} 的阈值下限不能大于上限", parameter))
                }
                Some(_) => {}
            }
        }

        if let Some(extra) = self
            .thresholds
            .keys()
            .find(|p| !ParameterType::MONITORED.contains(p))
        {
            return Err(format!("参数 {} 不支持配置阈值", extra));
        }

        Ok(())
    }
}
