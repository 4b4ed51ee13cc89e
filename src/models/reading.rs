//! 传感器读数模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::utils::{days_ago, hours_ago};

/// 监测参数类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "parameter_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    Temperature,
    Ph,
    DissolvedOxygen,
    Ammonia,
    Nitrate,
    Turbidity,
    Salinity,
}

impl ParameterType {
    pub const ALL: [ParameterType; 7] = [
        ParameterType::Temperature,
        ParameterType::Ph,
        ParameterType::DissolvedOxygen,
        ParameterType::Ammonia,
        ParameterType::Nitrate,
        ParameterType::Turbidity,
        ParameterType::Salinity,
    ];

    /// 用户偏好中保存阈值的参数
    pub const MONITORED: [ParameterType; 4] = [
        ParameterType::Temperature,
        ParameterType::Ph,
        ParameterType::DissolvedOxygen,
        ParameterType::Ammonia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Temperature => "temperature",
            ParameterType::Ph => "ph",
            ParameterType::DissolvedOxygen => "dissolved_oxygen",
            ParameterType::Ammonia => "ammonia",
            ParameterType::Nitrate => "nitrate",
            ParameterType::Turbidity => "turbidity",
            ParameterType::Salinity => "salinity",
        }
    }

    /// 预警记录中的参数名称，例如 `Dissolved Oxygen`
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterType::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("未知的监测参数: {}", s))
    }
}

/// 传感器读数（读取时关联传感器信息）
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SensorReading {
    pub id: Uuid,
    pub sensor_id: Uuid,
    pub farm_id: Uuid,
    pub sensor_name: String,
    pub parameter_type: ParameterType,
    pub value: f64,
    pub unit: String,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// 预警判定所需的传感器上下文
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SensorContext {
    pub sensor_id: Uuid,
    pub farm_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub sensor_type: ParameterType,
}

/// 读数上报请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngestReadingRequest {
    pub sensor_id: Uuid,

    pub value: f64,

    #[validate(length(min = 1, max = 20, message = "单位长度应在 1-20 字符之间"))]
    pub unit: String,

    /// 设备端记录时间（可选，默认使用服务器时间）
    pub recorded_at: Option<DateTime<Utc>>,
}

impl IngestReadingRequest {
    /// 校验数值与时间戳
    pub fn validate_reading(&self) -> Result<(), String> {
        if !self.value.is_finite() {
            return Err("读数必须是有限数值".to_string());
        }

        if let Some(recorded_at) = self.recorded_at {
            if recorded_at > Utc::now() {
                return Err("记录时间不能是未来时间".to_string());
            }
        }

        Ok(())
    }
}

/// 上报结果：读数以及可能产生的预警
#[derive(Debug, Clone, Serialize)]
pub struct IngestReadingResponse {
    pub reading: SensorReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<super::Alert>,
}

/// 读数查询的时间范围快捷项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRangePreset {
    LastHour,
    #[default]
    LastDay,
    LastWeek,
    LastMonth,
}

impl TimeRangePreset {
    /// 无法识别的取值按 24h 处理
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("1h") => TimeRangePreset::LastHour,
            Some("24h") => TimeRangePreset::LastDay,
            Some("7d") => TimeRangePreset::LastWeek,
            Some("30d") => TimeRangePreset::LastMonth,
            _ => TimeRangePreset::LastDay,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        match self {
            TimeRangePreset::LastHour => hours_ago(1),
            TimeRangePreset::LastDay => hours_ago(24),
            TimeRangePreset::LastWeek => days_ago(7),
            TimeRangePreset::LastMonth => days_ago(30),
        }
    }
}

/// 读数列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingListQuery {
    pub sensor_id: Option<Uuid>,
    pub farm_id: Option<Uuid>,
    pub time_range: Option<String>,
}

impl ReadingListQuery {
    pub fn preset(&self) -> TimeRangePreset {
        TimeRangePreset::parse(self.time_range.as_deref())
    }
}

/// 按农场和时间窗口筛选读数
#[derive(Debug, Clone)]
pub struct ReadingFilter {
    pub sensor_id: Option<Uuid>,
    pub farm_id: Option<Uuid>,
    pub from: DateTime<Utc>,
    pub to: Option<DateTime<Utc>>,
    /// 为空表示不限参数类型
    pub parameters: Option<Vec<ParameterType>>,
    pub ascending: bool,
    pub limit: i64,
}

impl ReadingFilter {
    pub fn matches(&self, reading: &SensorReading) -> bool {
        self.sensor_id.map_or(true, |id| reading.sensor_id == id)
            && self.farm_id.map_or(true, |id| reading.farm_id == id)
            && reading.recorded_at >= self.from
            && self.to.map_or(true, |to| reading.recorded_at <= to)
            && self
                .parameters
                .as_ref()
                .map_or(true, |ps| ps.contains(&reading.parameter_type))
    }
}
