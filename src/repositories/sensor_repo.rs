//! 传感器数据仓库

use async_trait::async_trait;
use uuid::Uuid;

use super::stores::SensorStore;
use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::SensorContext;

#[derive(Clone)]
pub struct SensorRepository {
    pool: PostgresPool,
}

impl SensorRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SensorStore for SensorRepository {
    /// 传感器及其所属农场的养殖户
    async fn find_context(&self, sensor_id: Uuid) -> Result<Option<SensorContext>, AppError> {
        let context = sqlx::query_as::<_, SensorContext>(
            r#"
            SELECT s.id AS sensor_id, s.farm_id, f.owner_id, s.name, s.sensor_type
            FROM sensors s
            JOIN farms f ON f.id = s.farm_id
            WHERE s.id = $1
            "#,
        )
        .bind(sensor_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(context)
    }
}
