//! 预警业务服务

use crate::config::{AlertingSettings, DuplicatePolicy};
use crate::errors::AppError;
use crate::models::{
    Alert, AlertListQuery, AlertStatus, AlertStatusChange, SensorReading, UpdateAlertStatusRequest,
    UserPreferences,
};
use crate::repositories::{AlertStore, PreferenceStore, SensorStore};
use crate::services::alert_evaluator;
use crate::utils::with_deadline;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 通知发送器trait（用于依赖注入）
#[async_trait::async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_alert_notification(&self, alert: &Alert, owner_id: Uuid) -> Result<(), AppError>;
}

/// 跳过预警判定的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownSensor,
    NoPreferences,
}

/// 读数预警检查的结果
///
/// 检查是读数写入后的附带动作，结果只记录日志，不会让上报失败。
#[derive(Debug, Clone, PartialEq)]
pub enum AlertCheckOutcome {
    Created(Alert),
    WithinRange,
    /// 已有同参数且级别不低于本次的活跃预警
    Suppressed { active_alert_id: Uuid },
    Skipped(SkipReason),
    Failed(String),
}

impl AlertCheckOutcome {
    pub fn into_alert(self) -> Option<Alert> {
        match self {
            AlertCheckOutcome::Created(alert) => Some(alert),
            _ => None,
        }
    }
}

/// 预警业务服务
pub struct AlertService {
    alerts: Arc<dyn AlertStore>,
    sensors: Arc<dyn SensorStore>,
    preferences: Arc<dyn PreferenceStore>,
    notification_service: Option<Arc<dyn NotificationSender>>,
    settings: AlertingSettings,
}

impl AlertService {
    pub fn new(
        alerts: Arc<dyn AlertStore>,
        sensors: Arc<dyn SensorStore>,
        preferences: Arc<dyn PreferenceStore>,
        settings: AlertingSettings,
    ) -> Self {
        Self {
            alerts,
            sensors,
            preferences,
            notification_service: None,
            settings,
        }
    }

    /// 设置通知服务
    pub fn set_notification_service(&mut self, notification_service: Arc<dyn NotificationSender>) {
        self.notification_service = Some(notification_service);
    }

    /// 对新写入的读数做阈值检查，任何错误都只记录日志
    pub async fn check_reading(&self, reading: &SensorReading) -> AlertCheckOutcome {
        let outcome = match self.try_check(reading).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    sensor_id = %reading.sensor_id,
                    reading_id = %reading.id,
                    "预警检查失败，读数已保存"
                );
                AlertCheckOutcome::Failed(e.to_string())
            }
        };

        match &outcome {
            AlertCheckOutcome::Created(alert) => tracing::info!(
                alert_id = %alert.id,
                sensor_id = %reading.sensor_id,
                severity = ?alert.severity,
                value = reading.value,
                threshold = alert.threshold_value,
                "触发预警"
            ),
            AlertCheckOutcome::Suppressed { active_alert_id } => tracing::debug!(
                sensor_id = %reading.sensor_id,
                active_alert_id = %active_alert_id,
                "已有活跃预警，跳过"
            ),
            AlertCheckOutcome::Skipped(reason) => tracing::debug!(
                sensor_id = %reading.sensor_id,
                reason = ?reason,
                "跳过预警检查"
            ),
            AlertCheckOutcome::WithinRange | AlertCheckOutcome::Failed(_) => {}
        }

        outcome
    }

    async fn try_check(&self, reading: &SensorReading) -> Result<AlertCheckOutcome, AppError> {
        let timeout = self.settings.context_timeout();

        let context = match with_deadline(
            timeout,
            "查询传感器",
            self.sensors.find_context(reading.sensor_id),
        )
        .await?
        {
            Some(context) => context,
            None => return Ok(AlertCheckOutcome::Skipped(SkipReason::UnknownSensor)),
        };

        let preferences = match with_deadline(
            timeout,
            "查询阈值配置",
            self.preferences.find_preferences(context.owner_id),
        )
        .await?
        {
            Some(preferences) => preferences,
            None => return Ok(AlertCheckOutcome::Skipped(SkipReason::NoPreferences)),
        };

        let descriptor =
            match alert_evaluator::evaluate(reading, &preferences.threshold_preferences()) {
                Some(descriptor) => descriptor,
                None => return Ok(AlertCheckOutcome::WithinRange),
            };

        let new_alert = descriptor.into_new_alert(context.farm_id, reading.sensor_id);

        if self.settings.duplicate_policy == DuplicatePolicy::SuppressWhileActive {
            let active = with_deadline(
                timeout,
                "查询活跃预警",
                self.alerts.find_active(reading.sensor_id, &new_alert.parameter),
            )
            .await?;

            // 级别升高时照常生成新预警
            if let Some(active) = active.filter(|a| a.severity.covers(new_alert.severity)) {
                return Ok(AlertCheckOutcome::Suppressed {
                    active_alert_id: active.id,
                });
            }
        }

        let alert = with_deadline(timeout, "写入预警", self.alerts.insert_alert(&new_alert)).await?;

        self.notify(&alert, &preferences).await;

        Ok(AlertCheckOutcome::Created(alert))
    }

    /// 按养殖户的通知偏好发送通知，失败不影响预警记录
    async fn notify(&self, alert: &Alert, preferences: &UserPreferences) {
        let Some(ref notification_service) = self.notification_service else {
            return;
        };

        if !preferences.notifications.should_notify(alert.severity) {
            tracing::debug!(alert_id = %alert.id, severity = ?alert.severity, "通知偏好不要求推送");
            return;
        }

        if let Err(e) = notification_service
            .send_alert_notification(alert, preferences.user_id)
            .await
        {
            tracing::error!(
                error = %e,
                alert_id = %alert.id,
                user_id = %preferences.user_id,
                "通知发送失败"
            );
        }
    }

    /// 查询预警列表（最新的在前）
    pub async fn list(&self, query: AlertListQuery) -> Result<Vec<Alert>, AppError> {
        query.validate()?;
        self.alerts.list_alerts(&query).await
    }

    /// 更新预警状态
    pub async fn update_status(
        &self,
        alert_id: Uuid,
        request: UpdateAlertStatusRequest,
    ) -> Result<Alert, AppError> {
        let change = AlertStatusChange::new(request.status, request.user_id, Utc::now());

        let alert = self
            .alerts
            .update_status(alert_id, &change)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("预警不存在: {}", alert_id)))?;

        tracing::info!(alert_id = %alert_id, status = ?alert.status, "预警状态已更新");

        Ok(alert)
    }

    /// 确认预警
    pub async fn acknowledge(&self, alert_id: Uuid, user_id: Option<Uuid>) -> Result<Alert, AppError> {
        self.update_status(
            alert_id,
            UpdateAlertStatusRequest {
                status: AlertStatus::Acknowledged,
                user_id,
            },
        )
        .await
    }

    /// 解决预警
    pub async fn resolve(&self, alert_id: Uuid) -> Result<Alert, AppError> {
        self.update_status(
            alert_id,
            UpdateAlertStatusRequest {
                status: AlertStatus::Resolved,
                user_id: None,
            },
        )
        .await
    }

    /// 删除预警
    pub async fn delete(&self, alert_id: Uuid) -> Result<(), AppError> {
        if !self.alerts.delete_alert(alert_id).await? {
            return Err(AppError::NotFound(format!("预警不存在: {}", alert_id)));
        }

        tracing::info!(alert_id = %alert_id, "预警已删除");
        Ok(())
    }
}
