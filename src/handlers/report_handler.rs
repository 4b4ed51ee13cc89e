//! 报表 API 处理器

use crate::errors::AppError;
use crate::models::{ApiResponse, GenerateReportRequest, ReportListQuery};
use crate::services::ReportService;
use crate::utils::require_uuid;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// 生成报表并直接返回文件内容
pub async fn generate_report(
    report_service: web::Data<Arc<ReportService>>,
    body: web::Json<GenerateReportRequest>,
) -> Result<HttpResponse, AppError> {
    let generated = report_service.generate(body.into_inner()).await?;

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(generated.filename())],
    };

    Ok(HttpResponse::Ok()
        .content_type(generated.file.content_type)
        .insert_header(disposition)
        .insert_header(("X-Report-Id", generated.report.id.to_string()))
        .body(generated.file.body))
}

/// 查询报表列表
pub async fn list_reports(
    report_service: web::Data<Arc<ReportService>>,
    query: web::Query<ReportListQuery>,
) -> Result<HttpResponse, AppError> {
    let reports = report_service.list(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reports)))
}

/// 获取报表记录
pub async fn get_report(
    report_service: web::Data<Arc<ReportService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let report_id = require_uuid(Some(path.as_str()), "report_id")?;
    let report = report_service.get(report_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}
