//! 用户偏好仓库

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::stores::PreferenceStore;
use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::{
    NotificationPreferences, ParameterType, ThresholdBound, UpdatePreferencesRequest,
    UserPreferences,
};

/// user_preferences 表的原始行，阈值按列平铺
#[derive(Debug, FromRow)]
struct PreferenceRow {
    user_id: Uuid,
    email_alerts: bool,
    sms_alerts: bool,
    push_notifications: bool,
    critical_only: bool,
    daily_reports: bool,
    weekly_reports: bool,
    temperature_min: f64,
    temperature_max: f64,
    ph_min: f64,
    ph_max: f64,
    oxygen_min: f64,
    oxygen_max: f64,
    ammonia_min: f64,
    ammonia_max: f64,
    updated_at: DateTime<Utc>,
}

impl From<PreferenceRow> for UserPreferences {
    fn from(row: PreferenceRow) -> Self {
        let thresholds = BTreeMap::from([
            (
                ParameterType::Temperature,
                ThresholdBound::new(row.temperature_min, row.temperature_max),
            ),
            (ParameterType::Ph, ThresholdBound::new(row.ph_min, row.ph_max)),
            (
                ParameterType::DissolvedOxygen,
                ThresholdBound::new(row.oxygen_min, row.oxygen_max),
            ),
            (
                ParameterType::Ammonia,
                ThresholdBound::new(row.ammonia_min, row.ammonia_max),
            ),
        ]);

        UserPreferences {
            user_id: row.user_id,
            notifications: NotificationPreferences {
                email_alerts: row.email_alerts,
                sms_alerts: row.sms_alerts,
                push_notifications: row.push_notifications,
                critical_only: row.critical_only,
                daily_reports: row.daily_reports,
                weekly_reports: row.weekly_reports,
            },
            thresholds,
            is_default: false,
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PostgresPool,
}

impl PreferenceRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

fn bound(request: &UpdatePreferencesRequest, parameter: ParameterType) -> Result<ThresholdBound, AppError> {
    request
        .thresholds
        .get(&parameter)
        .copied()
        .ok_or_else(|| AppError::ValidationError(format!("缺少参数 {} 的阈值", parameter)))
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn find_preferences(&self, user_id: Uuid) -> Result<Option<UserPreferences>, AppError> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            "SELECT * FROM user_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(row.map(UserPreferences::from))
    }

    /// 整体写入偏好（不存在则创建）
    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        request: &UpdatePreferencesRequest,
    ) -> Result<UserPreferences, AppError> {
        let temperature = bound(request, ParameterType::Temperature)?;
        let ph = bound(request, ParameterType::Ph)?;
        let oxygen = bound(request, ParameterType::DissolvedOxygen)?;
        let ammonia = bound(request, ParameterType::Ammonia)?;
        let n = &request.notifications;

        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            INSERT INTO user_preferences (
                user_id, email_alerts, sms_alerts, push_notifications, critical_only,
                daily_reports, weekly_reports,
                temperature_min, temperature_max, ph_min, ph_max,
                oxygen_min, oxygen_max, ammonia_min, ammonia_max, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                email_alerts = EXCLUDED.email_alerts,
                sms_alerts = EXCLUDED.sms_alerts,
                push_notifications = EXCLUDED.push_notifications,
                critical_only = EXCLUDED.critical_only,
                daily_reports = EXCLUDED.daily_reports,
                weekly_reports = EXCLUDED.weekly_reports,
                temperature_min = EXCLUDED.temperature_min,
                temperature_max = EXCLUDED.temperature_max,
                ph_min = EXCLUDED.ph_min,
                ph_max = EXCLUDED.ph_max,
                oxygen_min = EXCLUDED.oxygen_min,
                oxygen_max = EXCLUDED.oxygen_max,
                ammonia_min = EXCLUDED.ammonia_min,
                ammonia_max = EXCLUDED.ammonia_max,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(n.email_alerts)
        .bind(n.sms_alerts)
        .bind(n.push_notifications)
        .bind(n.critical_only)
        .bind(n.daily_reports)
        .bind(n.weekly_reports)
        .bind(temperature.min)
        .bind(temperature.max)
        .bind(ph.min)
        .bind(ph.max)
        .bind(oxygen.min)
        .bind(oxygen.max)
        .bind(ammonia.min)
        .bind(ammonia.max)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(row.into())
    }
}
