//! 报表格式化

use crate::errors::AppError;
use crate::models::{FormattedReport, ReportFormat, ReportPayload, SensorReading};
use crate::utils::format_iso8601;

pub const CSV_HEADER: &str = "Timestamp,Sensor Type,Sensor Name,Value,Unit";

/// 按请求的格式输出报表
pub fn format(payload: &ReportPayload, format: ReportFormat) -> Result<FormattedReport, AppError> {
    let body = match format {
        ReportFormat::Json => serde_json::to_vec_pretty(payload)
            .map_err(|e| AppError::InternalError(format!("报表序列化失败: {}", e)))?,
        ReportFormat::Csv => to_csv(&payload.sensor_readings).into_bytes(),
    };

    Ok(FormattedReport {
        body,
        content_type: format.content_type(),
        file_extension: format.file_extension(),
    })
}

/// 每条读数一行，字段直接以逗号拼接。
///
/// 字段内容不做引号转义，传感器名称中含逗号时列会错位。
pub fn to_csv(readings: &[SensorReading]) -> String {
    let mut lines = Vec::with_capacity(readings.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for reading in readings {
        lines.push(
            [
                format_iso8601(&reading.recorded_at),
                reading.parameter_type.to_string(),
                reading.sensor_name.clone(),
                reading.value.to_string(),
                reading.unit.clone(),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}
