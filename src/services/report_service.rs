//! 报表生成服务
//!
//! 流程：校验 → 写入 generating 记录 → 拉取读数与预警 → 统计 → 格式化 →
//! 标记 completed。拉取到格式化之间任一步出错，记录会被标记为 failed，
//! 错误原样返回给调用方，不做重试。

use crate::config::ReportingSettings;
use crate::errors::AppError;
use crate::models::{
    AlertWindow, FormattedReport, GenerateReportRequest, GeneratedReport, NewReport,
    ParameterSelection, ReadingFilter, Report, ReportFormat, ReportInfo, ReportListQuery,
    ReportPayload, ReportState, ReportSummary, TimeRange,
};
use crate::repositories::{AlertStore, ReadingStore, ReportStore};
use crate::services::{report_formatter, statistics};
use crate::utils::with_deadline;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 报表列表最多返回的条数
pub const MAX_REPORTS_PER_QUERY: i64 = 50;

/// 报表生成服务
pub struct ReportService {
    readings: Arc<dyn ReadingStore>,
    alerts: Arc<dyn AlertStore>,
    reports: Arc<dyn ReportStore>,
    settings: ReportingSettings,
}

impl ReportService {
    pub fn new(
        readings: Arc<dyn ReadingStore>,
        alerts: Arc<dyn AlertStore>,
        reports: Arc<dyn ReportStore>,
        settings: ReportingSettings,
    ) -> Self {
        Self {
            readings,
            alerts,
            reports,
            settings,
        }
    }

    /// 生成报表
    pub async fn generate(&self, request: GenerateReportRequest) -> Result<GeneratedReport, AppError> {
        request.validate()?;

        TimeRange::new(request.date_from, request.date_to)
            .validate(self.settings.max_range_days)
            .map_err(AppError::InvalidRange)?;

        let selection =
            ParameterSelection::parse(&request.parameters).map_err(AppError::ValidationError)?;
        let format = ReportFormat::from_request(request.format.as_deref());

        let report = with_deadline(
            self.settings.fetch_timeout(),
            "创建报表记录",
            self.reports.create_report(&NewReport {
                farm_id: request.farm_id,
                name: request.name.trim().to_string(),
                report_type: request.report_type,
                parameters: request.parameters.clone(),
                date_from: request.date_from,
                date_to: request.date_to,
            }),
        )
        .await?;

        tracing::info!(
            report_id = %report.id,
            farm_id = %report.farm_id,
            format = ?format,
            "开始生成报表"
        );

        match self.run(&report, &selection, format).await {
            Ok(generated) => {
                tracing::info!(
                    report_id = %generated.report.id,
                    file_size_bytes = generated.file.body.len(),
                    "报表生成完成"
                );
                Ok(generated)
            }
            Err(e) => {
                self.mark_failed(report.id, &e).await;
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        report: &Report,
        selection: &ParameterSelection,
        format: ReportFormat,
    ) -> Result<GeneratedReport, AppError> {
        let file = self.build(report, selection, format).await?;

        let completed = with_deadline(
            self.settings.fetch_timeout(),
            "更新报表状态",
            self.reports.save_state(
                report.id,
                &ReportState::Completed {
                    size_bytes: file.body.len() as u64,
                },
            ),
        )
        .await?;

        Ok(GeneratedReport {
            report: completed,
            file,
        })
    }

    async fn build(
        &self,
        report: &Report,
        selection: &ParameterSelection,
        format: ReportFormat,
    ) -> Result<FormattedReport, AppError> {
        let timeout = self.settings.fetch_timeout();
        // 多取一行用来判断是否超限
        let fetch_limit = self.settings.max_rows.saturating_add(1);

        let reading_filter = ReadingFilter {
            sensor_id: None,
            farm_id: Some(report.farm_id),
            from: report.date_from,
            to: Some(report.date_to),
            parameters: selection.as_filter(),
            ascending: true,
            limit: fetch_limit,
        };
        let alert_window = AlertWindow {
            farm_id: report.farm_id,
            from: report.date_from,
            to: report.date_to,
            limit: fetch_limit,
        };

        let (readings, alerts) = futures::try_join!(
            with_deadline(timeout, "拉取读数", self.readings.list_readings(&reading_filter)),
            with_deadline(timeout, "拉取预警", self.alerts.list_alerts_in_window(&alert_window)),
        )?;

        if readings.len() as i64 > self.settings.max_rows
            || alerts.len() as i64 > self.settings.max_rows
        {
            return Err(AppError::InvalidRange(format!(
                "时间窗口内数据超过 {} 行，请缩小时间范围",
                self.settings.max_rows
            )));
        }

        let payload = ReportPayload {
            report_info: ReportInfo {
                name: report.name.clone(),
                report_type: report.report_type,
                farm_id: report.farm_id,
                date_from: report.date_from,
                date_to: report.date_to,
                parameters: report.parameters.clone(),
                generated_at: Utc::now(),
            },
            statistics: statistics::aggregate(&readings),
            summary: ReportSummary::new(readings.len(), &alerts),
            sensor_readings: readings,
            alerts,
        };

        report_formatter::format(&payload, format)
    }

    /// 尽力把记录标记为 failed，失败只记录日志
    async fn mark_failed(&self, report_id: Uuid, cause: &AppError) {
        let state = ReportState::Failed {
            reason: cause.public_message(),
        };

        let saved = with_deadline(
            self.settings.fetch_timeout(),
            "更新报表状态",
            self.reports.save_state(report_id, &state),
        )
        .await;

        match saved {
            Ok(_) => tracing::warn!(report_id = %report_id, error = %cause, "报表生成失败"),
            Err(e) => tracing::error!(
                report_id = %report_id,
                error = %cause,
                save_error = %e,
                "报表生成失败，且无法记录失败状态"
            ),
        }
    }

    /// 查询报表列表（最新的在前）
    pub async fn list(&self, query: ReportListQuery) -> Result<Vec<Report>, AppError> {
        self.reports
            .list_reports(query.farm_id, MAX_REPORTS_PER_QUERY)
            .await
    }

    /// 获取报表记录
    pub async fn get(&self, report_id: Uuid) -> Result<Report, AppError> {
        self.reports
            .find_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("报表不存在: {}", report_id)))
    }
}
