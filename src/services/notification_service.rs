//! 预警通知
//!
//! 内置实现只输出一条结构化日志，外部渠道（邮件、短信、推送）由部署方接入
//! [`NotificationSender`] 实现。

use crate::errors::AppError;
use crate::models::Alert;
use crate::services::alert_service::NotificationSender;
use uuid::Uuid;

/// 以日志事件形式发出的预警通知
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationService;

#[async_trait::async_trait]
impl NotificationSender for LogNotificationService {
    async fn send_alert_notification(&self, alert: &Alert, owner_id: Uuid) -> Result<(), AppError> {
        tracing::info!(
            target: "aquaguard::notification",
            alert_id = %alert.id,
            farm_id = %alert.farm_id,
            owner_id = %owner_id,
            severity = ?alert.severity,
            parameter = %alert.parameter,
            message = %alert.message,
            "预警通知"
        );
        Ok(())
    }
}
