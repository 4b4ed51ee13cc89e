//! 路由配置模块

use crate::errors::AppError;
use crate::handlers;
use actix_web::web;

/// 配置所有路由
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // 请求体与查询参数解析失败统一返回 400
        .app_data(
            web::JsonConfig::default()
                .limit(256 * 1024)
                .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
        )
        // 健康检查路由
        .service(
            web::scope("/health")
                .route("", web::get().to(handlers::health))
                .route("/detailed", web::get().to(handlers::health_detailed))
                .route("/ready", web::get().to(handlers::ready))
                .route("/live", web::get().to(handlers::live)),
        )
        // API v1 路由
        .service(
            web::scope("/api/v1")
                // 读数
                .service(
                    web::scope("/readings")
                        .route("", web::post().to(handlers::ingest_reading))
                        .route("", web::get().to(handlers::list_readings)),
                )
                // 预警
                .service(
                    web::scope("/alerts")
                        .route("", web::get().to(handlers::list_alerts))
                        .route("", web::delete().to(handlers::delete_alert_by_query))
                        .route("/{id}", web::put().to(handlers::update_alert))
                        .route("/{id}", web::delete().to(handlers::delete_alert))
                        .route("/{id}/acknowledge", web::post().to(handlers::acknowledge_alert))
                        .route("/{id}/resolve", web::post().to(handlers::resolve_alert)),
                )
                // 报表
                .service(
                    web::scope("/reports")
                        .route("", web::post().to(handlers::generate_report))
                        .route("", web::get().to(handlers::list_reports))
                        .route("/{id}", web::get().to(handlers::get_report)),
                )
                // 阈值配置
                .service(
                    web::scope("/thresholds")
                        .route("/{owner_id}", web::get().to(handlers::get_thresholds))
                        .route("/{owner_id}", web::put().to(handlers::update_thresholds)),
                ),
        );
}
