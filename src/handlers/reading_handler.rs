//! 读数 API 处理器

use crate::errors::AppError;
use crate::models::{ApiResponse, IngestReadingRequest, ReadingListQuery};
use crate::services::ReadingService;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// 上报读数
pub async fn ingest_reading(
    reading_service: web::Data<Arc<ReadingService>>,
    body: web::Json<IngestReadingRequest>,
) -> Result<HttpResponse, AppError> {
    let response = reading_service.ingest(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::created(response)))
}

/// 查询读数
pub async fn list_readings(
    reading_service: web::Data<Arc<ReadingService>>,
    query: web::Query<ReadingListQuery>,
) -> Result<HttpResponse, AppError> {
    let readings = reading_service.list(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(readings)))
}
