//! 存储接口
//!
//! 服务层只依赖这些 trait，PostgreSQL 仓库和测试用的内存实现都实现它们。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Alert, AlertListQuery, AlertStatusChange, AlertWindow, IngestReadingRequest, NewAlert,
    NewReport, ReadingFilter, Report, ReportState, SensorContext, SensorReading,
    UpdatePreferencesRequest, UserPreferences,
};

/// 读数存储
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// 写入读数，传感器不存在时返回 `None`
    async fn insert_reading(
        &self,
        request: &IngestReadingRequest,
        recorded_at: DateTime<Utc>,
    ) -> Result<Option<SensorReading>, AppError>;

    async fn list_readings(&self, filter: &ReadingFilter) -> Result<Vec<SensorReading>, AppError>;
}

/// 传感器查询
#[async_trait]
pub trait SensorStore: Send + Sync {
    async fn find_context(&self, sensor_id: Uuid) -> Result<Option<SensorContext>, AppError>;
}

/// 预警存储
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert_alert(&self, alert: &NewAlert) -> Result<Alert, AppError>;

    /// 同一传感器同一参数级别最高的活跃预警（同级取最新）
    async fn find_active(&self, sensor_id: Uuid, parameter: &str) -> Result<Option<Alert>, AppError>;

    /// 按创建时间倒序
    async fn list_alerts(&self, query: &AlertListQuery) -> Result<Vec<Alert>, AppError>;

    /// 按创建时间升序
    async fn list_alerts_in_window(&self, window: &AlertWindow) -> Result<Vec<Alert>, AppError>;

    async fn update_status(
        &self,
        id: Uuid,
        change: &AlertStatusChange,
    ) -> Result<Option<Alert>, AppError>;

    /// 返回是否确实删除了记录
    async fn delete_alert(&self, id: Uuid) -> Result<bool, AppError>;
}

/// 报表元数据存储
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create_report(&self, report: &NewReport) -> Result<Report, AppError>;

    /// 只允许从 `generating` 推进，记录已结束时返回 `Conflict`
    async fn save_state(&self, id: Uuid, state: &ReportState) -> Result<Report, AppError>;

    async fn find_report(&self, id: Uuid) -> Result<Option<Report>, AppError>;

    /// 按创建时间倒序
    async fn list_reports(&self, farm_id: Option<Uuid>, limit: i64) -> Result<Vec<Report>, AppError>;
}

/// 用户偏好存储
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn find_preferences(&self, user_id: Uuid) -> Result<Option<UserPreferences>, AppError>;

    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        request: &UpdatePreferencesRequest,
    ) -> Result<UserPreferences, AppError>;
}
