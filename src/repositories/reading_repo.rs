//! 读数数据仓库

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::stores::ReadingStore;
use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::{IngestReadingRequest, ReadingFilter, SensorReading};

/// 读数数据仓库
#[derive(Clone)]
pub struct ReadingRepository {
    pool: PostgresPool,
}

impl ReadingRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for ReadingRepository {
    async fn insert_reading(
        &self,
        request: &IngestReadingRequest,
        recorded_at: DateTime<Utc>,
    ) -> Result<Option<SensorReading>, AppError> {
        // 传感器不存在时 INSERT ... SELECT 不写入任何行
        let reading = sqlx::query_as::<_, SensorReading>(
            r#"
            WITH inserted AS (
                INSERT INTO sensor_readings (id, sensor_id, value, unit, recorded_at)
                SELECT $1, s.id, $3, $4, $5 FROM sensors s WHERE s.id = $2
                RETURNING *
            ),
            touched AS (
                UPDATE sensors SET last_reading_at = GREATEST(COALESCE(last_reading_at, $5), $5)
                WHERE id IN (SELECT sensor_id FROM inserted)
            )
            SELECT i.id, i.sensor_id, s.farm_id, s.name AS sensor_name,
                   s.sensor_type AS parameter_type, i.value, i.unit, i.recorded_at, i.created_at
            FROM inserted i
            JOIN sensors s ON s.id = i.sensor_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.sensor_id)
        .bind(request.value)
        .bind(request.unit.trim())
        .bind(recorded_at)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(reading)
    }

    async fn list_readings(&self, filter: &ReadingFilter) -> Result<Vec<SensorReading>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT r.id, r.sensor_id, s.farm_id, s.name AS sensor_name,
                   s.sensor_type AS parameter_type, r.value, r.unit, r.recorded_at, r.created_at
            FROM sensor_readings r
            JOIN sensors s ON s.id = r.sensor_id
            WHERE r.recorded_at >= "#,
        );
        builder.push_bind(filter.from);

        if let Some(to) = filter.to {
            builder.push(" AND r.recorded_at <= ").push_bind(to);
        }
        if let Some(sensor_id) = filter.sensor_id {
            builder.push(" AND r.sensor_id = ").push_bind(sensor_id);
        }
        if let Some(farm_id) = filter.farm_id {
            builder.push(" AND s.farm_id = ").push_bind(farm_id);
        }
        if let Some(parameters) = &filter.parameters {
            let names: Vec<String> = parameters.iter().map(|p| p.as_str().to_string()).collect();
            builder
                .push(" AND s.sensor_type::text = ANY(")
                .push_bind(names)
                .push(")");
        }

        builder.push(if filter.ascending {
            " ORDER BY r.recorded_at ASC"
        } else {
            " ORDER BY r.recorded_at DESC"
        });
        builder.push(" LIMIT ").push_bind(filter.limit);

        let readings = builder
            .build_query_as::<SensorReading>()
            .fetch_all(self.pool.pool())
            .await?;

        Ok(readings)
    }
}
