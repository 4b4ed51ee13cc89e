//! 预警数据仓库

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::stores::AlertStore;
use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::{Alert, AlertListQuery, AlertStatus, AlertStatusChange, AlertWindow, NewAlert};

/// 预警数据仓库
#[derive(Clone)]
pub struct AlertRepository {
    pool: PostgresPool,
}

impl AlertRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    /// 创建预警
    async fn insert_alert(&self, alert: &NewAlert) -> Result<Alert, AppError> {
        let now = Utc::now();

        let alert = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (id, farm_id, sensor_id, severity, parameter, current_value,
                                threshold_value, message, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(alert.farm_id)
        .bind(alert.sensor_id)
        .bind(alert.severity)
        .bind(&alert.parameter)
        .bind(alert.current_value)
        .bind(alert.threshold_value)
        .bind(&alert.message)
        .bind(AlertStatus::Active)
        .bind(now)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(alert)
    }

    async fn find_active(&self, sensor_id: Uuid, parameter: &str) -> Result<Option<Alert>, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
            WHERE sensor_id = $1 AND parameter = $2 AND status = 'active'
            -- 枚举声明顺序为 critical, warning, info
            ORDER BY severity ASC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(sensor_id)
        .bind(parameter)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(alert)
    }

    /// 查询预警列表
    async fn list_alerts(&self, query: &AlertListQuery) -> Result<Vec<Alert>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM alerts WHERE 1=1");

        if let Some(farm_id) = query.farm_id {
            builder.push(" AND farm_id = ").push_bind(farm_id);
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.limit);

        let alerts = builder
            .build_query_as::<Alert>()
            .fetch_all(self.pool.pool())
            .await?;

        Ok(alerts)
    }

    async fn list_alerts_in_window(&self, window: &AlertWindow) -> Result<Vec<Alert>, AppError> {
        let alerts = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
            WHERE farm_id = $1 AND created_at >= $2 AND created_at <= $3
            ORDER BY created_at ASC
            LIMIT $4
            "#,
        )
        .bind(window.farm_id)
        .bind(window.from)
        .bind(window.to)
        .bind(window.limit)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(alerts)
    }

    /// 更新预警状态
    async fn update_status(
        &self,
        id: Uuid,
        change: &AlertStatusChange,
    ) -> Result<Option<Alert>, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            r#"
            UPDATE alerts SET
                status = $2,
                acknowledged_by = $3,
                acknowledged_at = $4,
                resolved_at = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(change.status)
        .bind(change.acknowledged_by)
        .bind(change.acknowledged_at)
        .bind(change.resolved_at)
        .bind(change.updated_at)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(alert)
    }

    /// 删除预警
    async fn delete_alert(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
