//! 报表模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use super::{Alert, AlertSeverity, ParameterType, SensorReading};
use crate::errors::AppError;

/// 报表类型
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "report_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    #[default]
    Custom,
}

/// 报表状态（数据库枚举）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Generating,
    Completed,
    Failed,
}

/// 报表生成状态机
///
/// 合法转换只有 `Generating -> Completed` 与 `Generating -> Failed`。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReportState {
    Generating,
    Completed {
        #[serde(rename = "file_size_bytes")]
        size_bytes: u64,
    },
    Failed {
        #[serde(rename = "failure_reason")]
        reason: String,
    },
}

impl ReportState {
    pub fn status(&self) -> ReportStatus {
        match self {
            ReportState::Generating => ReportStatus::Generating,
            ReportState::Completed { .. } => ReportStatus::Completed,
            ReportState::Failed { .. } => ReportStatus::Failed,
        }
    }

    pub fn can_transition_to(&self, next: &ReportState) -> bool {
        matches!(
            (self, next),
            (ReportState::Generating, ReportState::Completed { .. })
                | (ReportState::Generating, ReportState::Failed { .. })
        )
    }

    /// 按转换表推进状态
    pub fn transition(&self, next: ReportState) -> Result<ReportState, AppError> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            Err(AppError::Conflict(format!(
                "报表状态不能从 {:?} 变更为 {:?}",
                self.status(),
                next.status()
            )))
        }
    }

    /// 由数据库字段还原
    pub fn from_parts(
        status: ReportStatus,
        file_size_bytes: Option<i64>,
        failure_reason: Option<String>,
    ) -> Self {
        match status {
            ReportStatus::Generating => ReportState::Generating,
            ReportStatus::Completed => ReportState::Completed {
                size_bytes: file_size_bytes.unwrap_or(0).max(0) as u64,
            },
            ReportStatus::Failed => ReportState::Failed {
                reason: failure_reason.unwrap_or_default(),
            },
        }
    }

    pub fn file_size_bytes(&self) -> Option<i64> {
        match self {
            ReportState::Completed { size_bytes } => Some(*size_bytes as i64),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ReportState::Failed { reason } => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// 报表记录
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub parameters: Vec<String>,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    #[serde(flatten)]
    pub state: ReportState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待写入的报表记录
#[derive(Debug, Clone)]
pub struct NewReport {
    pub farm_id: Uuid,
    pub name: String,
    pub report_type: ReportType,
    pub parameters: Vec<String>,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}

/// 生成报表请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateReportRequest {
    pub farm_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "报表名称长度应在 1-200 字符之间"))]
    pub name: String,

    #[serde(rename = "type", default)]
    pub report_type: ReportType,

    #[validate(length(min = 1, message = "至少选择一个监测参数"))]
    pub parameters: Vec<String>,

    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,

    /// `csv` 或 `json`，其他取值（包括 `pdf`）按 json 输出
    pub format: Option<String>,
}

/// 报表参数选择，`all` 表示全部参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSelection {
    All,
    Only(Vec<ParameterType>),
}

impl ParameterSelection {
    pub fn parse(raw: &[String]) -> Result<Self, String> {
        if raw.iter().any(|p| p == "all") {
            return Ok(ParameterSelection::All);
        }

        let mut parameters = raw
            .iter()
            .map(|p| p.parse::<ParameterType>())
            .collect::<Result<Vec<_>, _>>()?;
        parameters.sort();
        parameters.dedup();

        Ok(ParameterSelection::Only(parameters))
    }

    /// 转为读数过滤条件，`None` 表示不过滤
    pub fn as_filter(&self) -> Option<Vec<ParameterType>> {
        match self {
            ParameterSelection::All => None,
            ParameterSelection::Only(ps) => Some(ps.clone()),
        }
    }
}

/// 报表输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_request(format: Option<&str>) -> Self {
        match format.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("csv") => ReportFormat::Csv,
            _ => ReportFormat::Json,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

/// 单个参数的统计桶
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatBucket {
    /// 按记录时间升序排列
    pub values: Vec<f64>,
    pub unit: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub latest: f64,
}

/// 报表元信息
#[derive(Debug, Clone, Serialize)]
pub struct ReportInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub farm_id: Uuid,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub parameters: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// 报表汇总
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_readings: usize,
    pub total_alerts: usize,
    pub critical_alerts: usize,
    pub warning_alerts: usize,
}

impl ReportSummary {
    pub fn new(total_readings: usize, alerts: &[Alert]) -> Self {
        let count = |severity: AlertSeverity| alerts.iter().filter(|a| a.severity == severity).count();
        Self {
            total_readings,
            total_alerts: alerts.len(),
            critical_alerts: count(AlertSeverity::Critical),
            warning_alerts: count(AlertSeverity::Warning),
        }
    }
}

/// 报表内容
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub report_info: ReportInfo,
    pub statistics: BTreeMap<ParameterType, StatBucket>,
    pub sensor_readings: Vec<SensorReading>,
    pub alerts: Vec<Alert>,
    pub summary: ReportSummary,
}

/// 格式化后的报表文件
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedReport {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub file_extension: &'static str,
}

/// 生成完成的报表
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: Report,
    pub file: FormattedReport,
}

impl GeneratedReport {
    pub fn filename(&self) -> String {
        format!(
            "{}.{}",
            crate::utils::sanitize_input(&self.report.name),
            self.file.file_extension
        )
    }
}

/// 报表列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportListQuery {
    pub farm_id: Option<Uuid>,
}
