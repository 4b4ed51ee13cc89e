//! 数据验证工具

use crate::errors::AppError;
use uuid::Uuid;

/// 验证 UUID 格式（缺失或格式错误都视为参数错误）
pub fn require_uuid(value: Option<&str>, field_name: &str) -> Result<Uuid, AppError> {
    let raw = value
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError(format!("{} 不能为空", field_name)))?;

    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::ValidationError(format!("{} 不是有效的 UUID", field_name)))
}

/// 清理输入字符串（移除危险字符）
pub fn sanitize_input(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '\\' | '\0' | '\r' | '\n'))
        .collect()
}
