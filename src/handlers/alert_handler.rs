//! 预警 API 处理器

use crate::errors::AppError;
use crate::models::{AlertListQuery, ApiResponse, UpdateAlertStatusRequest};
use crate::services::AlertService;
use crate::utils::require_uuid;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// 确认预警的可选请求体
#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub user_id: Option<Uuid>,
}

/// 以查询参数传入预警 ID
#[derive(Debug, Deserialize)]
pub struct AlertIdQuery {
    pub id: Option<String>,
}

fn alert_id(raw: &str) -> Result<Uuid, AppError> {
    require_uuid(Some(raw), "alert_id")
}

/// 查询预警列表
pub async fn list_alerts(
    alert_service: web::Data<Arc<AlertService>>,
    query: web::Query<AlertListQuery>,
) -> Result<HttpResponse, AppError> {
    let alerts = alert_service.list(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(alerts)))
}

/// 更新预警状态
pub async fn update_alert(
    alert_service: web::Data<Arc<AlertService>>,
    path: web::Path<String>,
    body: web::Json<UpdateAlertStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let alert_id = alert_id(&path)?;

    let alert = alert_service
        .update_status(alert_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}

/// 确认预警
pub async fn acknowledge_alert(
    alert_service: web::Data<Arc<AlertService>>,
    path: web::Path<String>,
    body: Option<web::Json<AcknowledgeRequest>>,
) -> Result<HttpResponse, AppError> {
    let alert_id = alert_id(&path)?;
    let user_id = body.and_then(|b| b.into_inner().user_id);

    let alert = alert_service.acknowledge(alert_id, user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}

/// 解决预警
pub async fn resolve_alert(
    alert_service: web::Data<Arc<AlertService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let alert_id = alert_id(&path)?;

    let alert = alert_service.resolve(alert_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}

/// 删除预警
pub async fn delete_alert(
    alert_service: web::Data<Arc<AlertService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    alert_service.delete(alert_id(&path)?).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// 删除预警（`?id=` 形式）
pub async fn delete_alert_by_query(
    alert_service: web::Data<Arc<AlertService>>,
    query: web::Query<AlertIdQuery>,
) -> Result<HttpResponse, AppError> {
    let alert_id = require_uuid(query.id.as_deref(), "alert_id")?;

    alert_service.delete(alert_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
