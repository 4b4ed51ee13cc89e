//! 读数业务服务

use crate::errors::AppError;
use crate::models::{
    IngestReadingRequest, IngestReadingResponse, ReadingFilter, ReadingListQuery, SensorReading,
};
use crate::repositories::ReadingStore;
use crate::services::AlertService;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// 单次查询最多返回的读数条数
pub const MAX_READINGS_PER_QUERY: i64 = 1000;

/// 读数业务服务
pub struct ReadingService {
    readings: Arc<dyn ReadingStore>,
    alert_service: Arc<AlertService>,
}

impl ReadingService {
    pub fn new(readings: Arc<dyn ReadingStore>, alert_service: Arc<AlertService>) -> Self {
        Self {
            readings,
            alert_service,
        }
    }

    /// 写入读数并做阈值检查
    ///
    /// 读数写入成功即视为上报成功，预警检查的失败不会反馈给调用方。
    pub async fn ingest(&self, request: IngestReadingRequest) -> Result<IngestReadingResponse, AppError> {
        request.validate()?;
        request
            .validate_reading()
            .map_err(AppError::ValidationError)?;

        let recorded_at = request.recorded_at.unwrap_or_else(Utc::now);

        let reading = self
            .readings
            .insert_reading(&request, recorded_at)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("传感器不存在: {}", request.sensor_id)))?;

        tracing::debug!(
            sensor_id = %reading.sensor_id,
            parameter = %reading.parameter_type,
            value = reading.value,
            "读数已保存"
        );

        let alert = self.alert_service.check_reading(&reading).await.into_alert();

        Ok(IngestReadingResponse { reading, alert })
    }

    /// 查询读数（最新的在前）
    pub async fn list(&self, query: ReadingListQuery) -> Result<Vec<SensorReading>, AppError> {
        let filter = ReadingFilter {
            sensor_id: query.sensor_id,
            farm_id: query.farm_id,
            from: query.preset().start(),
            to: None,
            parameters: None,
            ascending: false,
            limit: MAX_READINGS_PER_QUERY,
        };

        self.readings.list_readings(&filter).await
    }
}
