//! 报表服务测试

use std::time::Duration as StdDuration;

use aquaguard::config::ReportingSettings;
use aquaguard::errors::AppError;
use aquaguard::models::{AlertSeverity, ParameterType, ReportListQuery, ReportState};
use aquaguard::services::report_formatter::CSV_HEADER;

use crate::helpers::{at, Fixture};
use crate::mocks::FailPoint;

/// 窗口内：三条水温、一条 pH；窗口外：一条水温
fn seed_readings(fixture: &Fixture) {
    let temperature = fixture.sensor(ParameterType::Temperature);
    let ph = fixture.sensor(ParameterType::Ph);

    fixture.backend.add_reading(temperature, 25.1, "°C", at(120));
    fixture.backend.add_reading(temperature, 24.2, "°C", at(10));
    fixture.backend.add_reading(temperature, 23.8, "°C", at(60));
    fixture.backend.add_reading(ph, 7.2, "pH", at(30));
    fixture.backend.add_reading(temperature, 30.0, "°C", at(-60));
}

#[tokio::test]
async fn test_csv_report() {
    let fixture = Fixture::new();
    seed_readings(&fixture);
    let service = fixture.report_service();

    let generated = assert_ok!(service.generate(fixture.report_request("csv")).await);

    assert_eq!(generated.file.content_type, "text/csv");
    assert_eq!(generated.filename(), "Weekly pond summary.csv");

    let text = String::from_utf8(generated.file.body.clone()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 5);
    // 按记录时间升序
    assert!(lines[1].starts_with("2024-06-01T00:10:00.000Z,temperature"));
    assert!(lines[4].contains(",25.1,"));

    assert_eq!(
        generated.report.state,
        ReportState::Completed {
            size_bytes: generated.file.body.len() as u64
        }
    );
    let stored = fixture.backend.reports.get(&generated.report.id).unwrap();
    assert_eq!(stored.state, generated.report.state);
}

#[tokio::test]
async fn test_json_report_statistics_and_summary() {
    let fixture = Fixture::new();
    seed_readings(&fixture);
    fixture.backend.add_alert(fixture.alert(AlertSeverity::Critical, at(15)));
    fixture.backend.add_alert(fixture.alert(AlertSeverity::Warning, at(16)));
    fixture.backend.add_alert(fixture.alert(AlertSeverity::Info, at(17)));
    fixture.backend.add_alert(fixture.alert(AlertSeverity::Critical, at(-5)));
    let service = fixture.report_service();

    let generated = assert_ok!(service.generate(fixture.report_request("json")).await);
    assert_eq!(generated.file.content_type, "application/json");
    assert_eq!(generated.filename(), "Weekly pond summary.json");

    let value: serde_json::Value = serde_json::from_slice(&generated.file.body).unwrap();
    let temperature = &value["statistics"]["temperature"];
    assert_eq!(temperature["count"], 3);
    assert_eq!(temperature["min"], 23.8);
    assert_eq!(temperature["max"], 25.1);
    assert_eq!(temperature["latest"], 25.1);
    let avg = temperature["avg"].as_f64().unwrap();
    assert!((avg - 24.3667).abs() < 1e-3);
    assert_eq!(value["statistics"]["ph"]["count"], 1);
    assert!(value["statistics"].get("ammonia").is_none());

    assert_eq!(value["summary"]["total_readings"], 4);
    assert_eq!(value["summary"]["total_alerts"], 3);
    assert_eq!(value["summary"]["critical_alerts"], 1);
    assert_eq!(value["summary"]["warning_alerts"], 1);
    assert_eq!(value["report_info"]["name"], "Weekly pond summary");
    assert_eq!(value["report_info"]["type"], "weekly");
}

#[tokio::test]
async fn test_unknown_format_falls_back_to_json() {
    let fixture = Fixture::new();
    let service = fixture.report_service();

    let generated = assert_ok!(service.generate(fixture.report_request("pdf")).await);
    assert_eq!(generated.file.file_extension, "json");

    let mut request = fixture.report_request("csv");
    request.format = None;
    let generated = assert_ok!(service.generate(request).await);
    assert_eq!(generated.file.file_extension, "json");
}

#[tokio::test]
async fn test_parameter_selection_filters_readings() {
    let fixture = Fixture::new();
    seed_readings(&fixture);
    let service = fixture.report_service();

    let mut request = fixture.report_request("csv");
    request.parameters = vec!["ph".to_string()];
    let generated = assert_ok!(service.generate(request).await);

    let text = String::from_utf8(generated.file.body).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains(",ph,"));
}

#[tokio::test]
async fn test_reversed_range_is_rejected_before_persisting() {
    let fixture = Fixture::new();
    let service = fixture.report_service();

    let mut request = fixture.report_request("csv");
    std::mem::swap(&mut request.date_from, &mut request.date_to);

    let err = assert_err!(service.generate(request).await);
    assert!(matches!(err, AppError::InvalidRange(_)));
    assert_eq!(fixture.backend.reports.count(), 0);
}

#[tokio::test]
async fn test_single_instant_window_is_valid() {
    let fixture = Fixture::new();
    fixture
        .backend
        .add_reading(fixture.sensor(ParameterType::Temperature), 24.0, "°C", at(0));
    let service = fixture.report_service();

    let mut request = fixture.report_request("csv");
    request.date_to = request.date_from;
    let generated = assert_ok!(service.generate(request).await);
    assert_eq!(String::from_utf8(generated.file.body).unwrap().lines().count(), 2);
}

#[tokio::test]
async fn test_unknown_parameter_is_rejected() {
    let fixture = Fixture::new();
    let service = fixture.report_service();

    let mut request = fixture.report_request("csv");
    request.parameters = vec!["chlorophyll".to_string()];

    let err = assert_err!(service.generate(request).await);
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(fixture.backend.reports.count(), 0);
}

#[tokio::test]
async fn test_fetch_failure_marks_report_failed() {
    let fixture = Fixture::new();
    fixture.backend.fail_at(FailPoint::ListReadings);
    let service = fixture.report_service();

    let err = assert_err!(service.generate(fixture.report_request("csv")).await);
    assert!(err.is_upstream());

    let reports = fixture.backend.reports.list();
    assert_eq!(reports.len(), 1);
    match &reports[0].state {
        ReportState::Failed { reason } => {
            // 记录里只保存对外的错误信息
            assert_eq!(reason, &err.public_message());
            assert!(!reason.to_lowercase().contains("pool"));
        }
        other => panic!("expected failed report, got {:?}", other),
    }
}

#[tokio::test]
async fn test_window_over_row_limit_fails() {
    let fixture = Fixture::new();
    seed_readings(&fixture);
    let service = fixture.report_service_with(ReportingSettings {
        max_rows: 2,
        ..Default::default()
    });

    let err = assert_err!(service.generate(fixture.report_request("json")).await);
    assert!(matches!(err, AppError::InvalidRange(_)));

    let report = &fixture.backend.reports.list()[0];
    assert!(matches!(report.state, ReportState::Failed { .. }));
}

#[tokio::test]
async fn test_window_at_row_limit_completes() {
    let fixture = Fixture::new();
    seed_readings(&fixture);
    let service = fixture.report_service_with(ReportingSettings {
        max_rows: 4,
        ..Default::default()
    });

    let generated = assert_ok!(service.generate(fixture.report_request("json")).await);
    let value: serde_json::Value = serde_json::from_slice(&generated.file.body).unwrap();
    assert_eq!(value["summary"]["total_readings"], 4);
    assert!(matches!(generated.report.state, ReportState::Completed { .. }));
}

#[tokio::test]
async fn test_alerts_over_row_limit_fail() {
    let fixture = Fixture::new();
    for minute in [5, 6, 7] {
        fixture
            .backend
            .add_alert(fixture.alert(AlertSeverity::Warning, at(minute)));
    }
    let service = fixture.report_service_with(ReportingSettings {
        max_rows: 2,
        ..Default::default()
    });

    let err = assert_err!(service.generate(fixture.report_request("csv")).await);
    assert!(matches!(err, AppError::InvalidRange(_)));
}

#[tokio::test]
async fn test_slow_fetch_times_out() {
    let fixture = Fixture::new();
    fixture.backend.delay_readings(StdDuration::from_millis(200));
    let service = fixture.report_service_with(ReportingSettings {
        fetch_timeout_seconds: 0,
        ..Default::default()
    });

    let err = assert_err!(service.generate(fixture.report_request("json")).await);
    assert!(matches!(err, AppError::Timeout(_)));

    let report = &fixture.backend.reports.list()[0];
    assert!(matches!(report.state, ReportState::Failed { .. }));
}

#[tokio::test]
async fn test_state_save_failure_is_returned() {
    let fixture = Fixture::new();
    fixture.backend.fail_at(FailPoint::SaveReportState);
    let service = fixture.report_service();

    let err = assert_err!(service.generate(fixture.report_request("csv")).await);
    assert!(err.is_upstream());

    // 失败状态也无法写入，记录停留在 generating
    let report = &fixture.backend.reports.list()[0];
    assert_eq!(report.state, ReportState::Generating);
}

#[tokio::test]
async fn test_list_and_get() {
    let fixture = Fixture::new();
    let service = fixture.report_service();

    let first = assert_ok!(service.generate(fixture.report_request("csv")).await);
    let second = assert_ok!(service.generate(fixture.report_request("json")).await);

    let reports = assert_ok!(
        service
            .list(ReportListQuery {
                farm_id: Some(fixture.farm_id),
            })
            .await
    );
    assert_eq!(reports.len(), 2);
    assert!(reports[0].created_at >= reports[1].created_at);

    let fetched = assert_ok!(service.get(first.report.id).await);
    assert_eq!(fetched.id, first.report.id);
    assert_ne!(fetched.id, second.report.id);

    let err = assert_err!(service.get(uuid::Uuid::new_v4()).await);
    assert!(matches!(err, AppError::NotFound(_)));

    let other_farm = assert_ok!(
        service
            .list(ReportListQuery {
                farm_id: Some(uuid::Uuid::new_v4()),
            })
            .await
    );
    assert!(other_farm.is_empty());
}
