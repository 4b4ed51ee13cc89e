//! 统一错误类型定义

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

/// 应用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 资源不存在 (404)
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 请求验证错误 (400)
    #[error("请求参数无效: {0}")]
    ValidationError(String),

    // 时间窗口无效 (400)
    #[error("时间范围无效: {0}")]
    InvalidRange(String),

    // 状态冲突 (409)
    #[error("资源冲突: {0}")]
    Conflict(String),

    // 数据库错误 (500)
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // 存储访问超时 (504)
    #[error("存储访问超时: {0}")]
    Timeout(String),

    // 内部错误 (500)
    #[error("内部服务错误: {0}")]
    InternalError(String),

    // 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl AppError {
    /// 是否为存储层（上游）故障
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::Timeout(_))
    }

    /// 可以返回给客户端的错误信息，存储层和内部错误不暴露细节
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::InvalidRange(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::DatabaseError(_) => "服务暂时不可用".to_string(),
            AppError::Timeout(_) => "服务响应超时，请缩小查询范围后重试".to_string(),
            AppError::InternalError(_) => "服务内部错误".to_string(),
            AppError::ConfigError(_) => "服务配置错误".to_string(),
        }
    }
}

/// API 错误响应结构
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.public_message();

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "请求处理错误");
        } else {
            tracing::warn!(error = %self, status = %status, "请求被拒绝");
        }

        HttpResponse::build(status).json(ErrorResponse {
            code: status.as_u16(),
            message,
        })
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
