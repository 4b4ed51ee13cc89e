//! 阈值配置 API 处理器

use crate::errors::AppError;
use crate::models::{ApiResponse, UpdatePreferencesRequest};
use crate::services::ThresholdService;
use crate::utils::require_uuid;
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

fn owner_id(raw: &str) -> Result<Uuid, AppError> {
    require_uuid(Some(raw), "owner_id")
}

/// 获取养殖户的阈值与通知偏好
pub async fn get_thresholds(
    threshold_service: web::Data<Arc<ThresholdService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let preferences = threshold_service.get(owner_id(&path)?).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(preferences)))
}

/// 替换养殖户的阈值与通知偏好
pub async fn update_thresholds(
    threshold_service: web::Data<Arc<ThresholdService>>,
    path: web::Path<String>,
    body: web::Json<UpdatePreferencesRequest>,
) -> Result<HttpResponse, AppError> {
    let preferences = threshold_service
        .update(owner_id(&path)?, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(preferences)))
}
