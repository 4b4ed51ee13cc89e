//! Mock 对象

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use aquaguard::errors::AppError;
use aquaguard::models::{
    Alert, AlertListQuery, AlertStatus, AlertStatusChange, AlertWindow, IngestReadingRequest,
    NewAlert, NewReport, ParameterType, ReadingFilter, Report, ReportState, SensorContext,
    SensorReading, UpdatePreferencesRequest, UserPreferences,
};
use aquaguard::repositories::{AlertStore, PreferenceStore, ReadingStore, ReportStore, SensorStore};
use aquaguard::services::NotificationSender;

/// 内存存储 Mock
#[derive(Debug)]
pub struct InMemoryStore<T: Clone> {
    data: Arc<Mutex<HashMap<Uuid, T>>>,
}

impl<T: Clone> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn insert(&self, id: Uuid, item: T) {
        let mut data = self.data.lock().unwrap();
        data.insert(id, item);
    }

    pub fn get(&self, id: &Uuid) -> Option<T> {
        let data = self.data.lock().unwrap();
        data.get(id).cloned()
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        let mut data = self.data.lock().unwrap();
        data.remove(id)
    }

    /// 原地修改一条记录，返回修改后的副本
    pub fn update<F: FnOnce(&mut T)>(&self, id: &Uuid, f: F) -> Option<T> {
        let mut data = self.data.lock().unwrap();
        data.get_mut(id).map(|item| {
            f(item);
            item.clone()
        })
    }

    pub fn list(&self) -> Vec<T> {
        let data = self.data.lock().unwrap();
        data.values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        let data = self.data.lock().unwrap();
        data.len()
    }
}

impl<T: Clone> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

/// 可注入故障的存储操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    InsertReading,
    ListReadings,
    FindSensor,
    FindPreferences,
    InsertAlert,
    ListAlerts,
    SaveReportState,
}

/// 实现全部存储接口的内存后端
#[derive(Default)]
pub struct MemoryBackend {
    pub sensors: InMemoryStore<SensorContext>,
    pub readings: InMemoryStore<SensorReading>,
    pub alerts: InMemoryStore<Alert>,
    pub reports: InMemoryStore<Report>,
    pub preferences: InMemoryStore<UserPreferences>,
    failures: Mutex<HashSet<FailPoint>>,
    reading_delay: Mutex<Option<Duration>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_at(&self, point: FailPoint) {
        self.failures.lock().unwrap().insert(point);
    }

    /// 读数查询前等待，用于模拟慢查询
    pub fn delay_readings(&self, delay: Duration) {
        *self.reading_delay.lock().unwrap() = Some(delay);
    }

    fn check(&self, point: FailPoint) -> Result<(), AppError> {
        if self.failures.lock().unwrap().contains(&point) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn add_sensor(&self, farm_id: Uuid, owner_id: Uuid, parameter: ParameterType) -> Uuid {
        let sensor_id = Uuid::new_v4();
        self.sensors.insert(
            sensor_id,
            SensorContext {
                sensor_id,
                farm_id,
                owner_id,
                name: format!("{} probe", parameter.label()),
                sensor_type: parameter,
            },
        );
        sensor_id
    }

    /// 直接写入一条历史读数
    pub fn add_reading(&self, sensor_id: Uuid, value: f64, unit: &str, recorded_at: DateTime<Utc>) -> SensorReading {
        let sensor = self.sensors.get(&sensor_id).expect("sensor must be seeded first");
        let reading = SensorReading {
            id: Uuid::new_v4(),
            sensor_id,
            farm_id: sensor.farm_id,
            sensor_name: sensor.name,
            parameter_type: sensor.sensor_type,
            value,
            unit: unit.to_string(),
            recorded_at,
            created_at: Utc::now(),
        };
        self.readings.insert(reading.id, reading.clone());
        reading
    }

    pub fn add_alert(&self, alert: Alert) {
        self.alerts.insert(alert.id, alert);
    }

    pub fn set_preferences(&self, preferences: UserPreferences) {
        self.preferences.insert(preferences.user_id, preferences);
    }
}

#[async_trait]
impl ReadingStore for MemoryBackend {
    async fn insert_reading(
        &self,
        request: &IngestReadingRequest,
        recorded_at: DateTime<Utc>,
    ) -> Result<Option<SensorReading>, AppError> {
        self.check(FailPoint::InsertReading)?;
        if self.sensors.get(&request.sensor_id).is_none() {
            return Ok(None);
        }
        Ok(Some(self.add_reading(
            request.sensor_id,
            request.value,
            request.unit.trim(),
            recorded_at,
        )))
    }

    async fn list_readings(&self, filter: &ReadingFilter) -> Result<Vec<SensorReading>, AppError> {
        let delay = *self.reading_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check(FailPoint::ListReadings)?;

        let mut readings: Vec<_> = self
            .readings
            .list()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        readings.sort_by_key(|r| r.recorded_at);
        if !filter.ascending {
            readings.reverse();
        }
        readings.truncate(filter.limit as usize);
        Ok(readings)
    }
}

#[async_trait]
impl SensorStore for MemoryBackend {
    async fn find_context(&self, sensor_id: Uuid) -> Result<Option<SensorContext>, AppError> {
        self.check(FailPoint::FindSensor)?;
        Ok(self.sensors.get(&sensor_id))
    }
}

#[async_trait]
impl AlertStore for MemoryBackend {
    async fn insert_alert(&self, alert: &NewAlert) -> Result<Alert, AppError> {
        self.check(FailPoint::InsertAlert)?;
        let now = Utc::now();
        let alert = Alert {
            id: Uuid::new_v4(),
            farm_id: alert.farm_id,
            sensor_id: alert.sensor_id,
            severity: alert.severity,
            parameter: alert.parameter.clone(),
            current_value: alert.current_value,
            threshold_value: alert.threshold_value,
            message: alert.message.clone(),
            status: AlertStatus::Active,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn find_active(&self, sensor_id: Uuid, parameter: &str) -> Result<Option<Alert>, AppError> {
        Ok(self
            .alerts
            .list()
            .into_iter()
            .filter(|a| {
                a.sensor_id == Some(sensor_id)
                    && a.parameter == parameter
                    && a.status == AlertStatus::Active
            })
            .max_by_key(|a| (a.severity.rank(), a.created_at)))
    }

    async fn list_alerts(&self, query: &AlertListQuery) -> Result<Vec<Alert>, AppError> {
        self.check(FailPoint::ListAlerts)?;
        let mut alerts: Vec<_> = self
            .alerts
            .list()
            .into_iter()
            .filter(|a| query.farm_id.map_or(true, |id| a.farm_id == id))
            .filter(|a| query.status.map_or(true, |s| a.status == s))
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts.truncate(query.limit as usize);
        Ok(alerts)
    }

    async fn list_alerts_in_window(&self, window: &AlertWindow) -> Result<Vec<Alert>, AppError> {
        self.check(FailPoint::ListAlerts)?;
        let mut alerts: Vec<_> = self
            .alerts
            .list()
            .into_iter()
            .filter(|a| {
                a.farm_id == window.farm_id
                    && a.created_at >= window.from
                    && a.created_at <= window.to
            })
            .collect();
        alerts.sort_by_key(|a| a.created_at);
        alerts.truncate(window.limit as usize);
        Ok(alerts)
    }

    async fn update_status(
        &self,
        id: Uuid,
        change: &AlertStatusChange,
    ) -> Result<Option<Alert>, AppError> {
        Ok(self.alerts.update(&id, |alert| change.apply(alert)))
    }

    async fn delete_alert(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.alerts.remove(&id).is_some())
    }
}

#[async_trait]
impl ReportStore for MemoryBackend {
    async fn create_report(&self, report: &NewReport) -> Result<Report, AppError> {
        let now = Utc::now();
        let report = Report {
            id: Uuid::new_v4(),
            farm_id: report.farm_id,
            name: report.name.clone(),
            report_type: report.report_type,
            parameters: report.parameters.clone(),
            date_from: report.date_from,
            date_to: report.date_to,
            state: ReportState::Generating,
            created_at: now,
            updated_at: now,
        };
        self.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn save_state(&self, id: Uuid, state: &ReportState) -> Result<Report, AppError> {
        self.check(FailPoint::SaveReportState)?;
        let current = self
            .reports
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("报表不存在: {}", id)))?;
        let next = current.state.transition(state.clone())?;

        self.reports
            .update(&id, |report| {
                report.state = next;
                report.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::NotFound(format!("报表不存在: {}", id)))
    }

    async fn find_report(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        Ok(self.reports.get(&id))
    }

    async fn list_reports(&self, farm_id: Option<Uuid>, limit: i64) -> Result<Vec<Report>, AppError> {
        let mut reports: Vec<_> = self
            .reports
            .list()
            .into_iter()
            .filter(|r| farm_id.map_or(true, |id| r.farm_id == id))
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(limit as usize);
        Ok(reports)
    }
}

#[async_trait]
impl PreferenceStore for MemoryBackend {
    async fn find_preferences(&self, user_id: Uuid) -> Result<Option<UserPreferences>, AppError> {
        self.check(FailPoint::FindPreferences)?;
        Ok(self.preferences.get(&user_id))
    }

    async fn upsert_preferences(
        &self,
        user_id: Uuid,
        request: &UpdatePreferencesRequest,
    ) -> Result<UserPreferences, AppError> {
        let preferences = UserPreferences {
            user_id,
            notifications: request.notifications,
            thresholds: request.thresholds.clone(),
            is_default: false,
            updated_at: Some(Utc::now()),
        };
        self.preferences.insert(user_id, preferences.clone());
        Ok(preferences)
    }
}

/// 记录发送过的通知
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Uuid, Uuid)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_alert_notification(&self, alert: &Alert, owner_id: Uuid) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((alert.id, owner_id));
        if self.fail {
            return Err(AppError::InternalError("通知渠道不可用".to_string()));
        }
        Ok(())
    }
}
