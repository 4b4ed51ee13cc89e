//! 测试辅助工具

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use aquaguard::config::{AlertingSettings, DuplicatePolicy, ReportingSettings};
use aquaguard::models::{
    Alert, AlertSeverity, AlertStatus, GenerateReportRequest, IngestReadingRequest, ParameterType,
    ReportType, UserPreferences,
};
use aquaguard::services::{
    AlertService, NotificationSender, ReadingService, ReportService, ThresholdService,
};

use crate::mocks::MemoryBackend;

/// 一个农场、一位养殖户、四个受监测参数各一个传感器
pub struct Fixture {
    pub backend: Arc<MemoryBackend>,
    pub farm_id: Uuid,
    pub owner_id: Uuid,
    pub sensors: HashMap<ParameterType, Uuid>,
}

impl Fixture {
    /// 养殖户已保存默认阈值
    pub fn new() -> Self {
        let fixture = Self::without_preferences();
        fixture
            .backend
            .set_preferences(saved_defaults(fixture.owner_id));
        fixture
    }

    pub fn without_preferences() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let farm_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();

        let sensors = ParameterType::MONITORED
            .iter()
            .map(|&p| (p, backend.add_sensor(farm_id, owner_id, p)))
            .collect();

        Self {
            backend,
            farm_id,
            owner_id,
            sensors,
        }
    }

    pub fn sensor(&self, parameter: ParameterType) -> Uuid {
        self.sensors[&parameter]
    }

    pub fn alert_service(&self, policy: DuplicatePolicy) -> AlertService {
        AlertService::new(
            self.backend.clone(),
            self.backend.clone(),
            self.backend.clone(),
            AlertingSettings {
                duplicate_policy: policy,
                ..Default::default()
            },
        )
    }

    pub fn alert_service_with(&self, notifier: Arc<dyn NotificationSender>) -> AlertService {
        let mut service = self.alert_service(DuplicatePolicy::SuppressWhileActive);
        service.set_notification_service(notifier);
        service
    }

    pub fn reading_service(&self) -> ReadingService {
        ReadingService::new(
            self.backend.clone(),
            Arc::new(self.alert_service(DuplicatePolicy::SuppressWhileActive)),
        )
    }

    pub fn report_service(&self) -> ReportService {
        self.report_service_with(ReportingSettings::default())
    }

    pub fn report_service_with(&self, settings: ReportingSettings) -> ReportService {
        ReportService::new(
            self.backend.clone(),
            self.backend.clone(),
            self.backend.clone(),
            settings,
        )
    }

    pub fn threshold_service(&self) -> ThresholdService {
        ThresholdService::new(self.backend.clone())
    }

    pub fn ingest(&self, parameter: ParameterType, value: f64, unit: &str) -> IngestReadingRequest {
        IngestReadingRequest {
            sensor_id: self.sensor(parameter),
            value,
            unit: unit.to_string(),
            recorded_at: None,
        }
    }

    pub fn report_request(&self, format: &str) -> GenerateReportRequest {
        GenerateReportRequest {
            farm_id: self.farm_id,
            name: "Weekly pond summary".to_string(),
            report_type: ReportType::Weekly,
            parameters: vec!["all".to_string()],
            date_from: at(0),
            date_to: at(24 * 60),
            format: Some(format.to_string()),
        }
    }

    pub fn alert(&self, severity: AlertSeverity, created_at: DateTime<Utc>) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            farm_id: self.farm_id,
            sensor_id: Some(self.sensor(ParameterType::DissolvedOxygen)),
            severity,
            parameter: ParameterType::DissolvedOxygen.label(),
            current_value: 5.2,
            threshold_value: 6.0,
            message: "Dissolved oxygen 5.2 mg/L is outside optimal range (6-10 mg/L)".to_string(),
            status: AlertStatus::Active,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_at: None,
            created_at,
            updated_at: created_at,
        }
    }
}

/// 已保存过的默认偏好
pub fn saved_defaults(owner_id: Uuid) -> UserPreferences {
    UserPreferences {
        is_default: false,
        updated_at: Some(Utc::now()),
        ..UserPreferences::defaults(owner_id)
    }
}

/// 报表窗口内的固定时刻（2024-06-01 起的第 N 分钟）
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
}

/// 断言结果是成功的
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// 断言结果是错误的
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(e) => e,
        }
    };
}
