//! AquaGuard - 水产养殖水质监测后端服务

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aquaguard::{
    config::{LoggingSettings, Settings},
    db::PostgresPool,
    handlers,
    middleware::RequestLogger,
    repositories::{
        AlertRepository, PreferenceRepository, ReadingRepository, ReportRepository,
        SensorRepository,
    },
    routes,
    services::{AlertService, LogNotificationService, ReadingService, ReportService, ThresholdService},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let settings = Settings::load().map_err(|e| {
        eprintln!("配置加载失败: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // 初始化日志
    init_tracing(&settings.logging);
    handlers::mark_started();

    info!("🐟 AquaGuard 服务启动中...");

    // 连接数据库
    let pg_pool = Arc::new(PostgresPool::new(&settings).await.map_err(|e| {
        tracing::error!(error = %e, "数据库连接失败");
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
    })?);
    info!("✅ 数据库连接成功");

    if settings.database.run_migrations {
        pg_pool
            .run_migrations()
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    }

    // 初始化仓库
    let reading_repo = Arc::new(ReadingRepository::new((*pg_pool).clone()));
    let sensor_repo = Arc::new(SensorRepository::new((*pg_pool).clone()));
    let alert_repo = Arc::new(AlertRepository::new((*pg_pool).clone()));
    let report_repo = Arc::new(ReportRepository::new((*pg_pool).clone()));
    let preference_repo = Arc::new(PreferenceRepository::new((*pg_pool).clone()));

    // 初始化服务
    let mut alert_service = AlertService::new(
        alert_repo.clone(),
        sensor_repo,
        preference_repo.clone(),
        settings.alerting.clone(),
    );
    alert_service.set_notification_service(Arc::new(LogNotificationService));
    let alert_service = Arc::new(alert_service);

    let reading_service = Arc::new(ReadingService::new(reading_repo.clone(), alert_service.clone()));
    let report_service = Arc::new(ReportService::new(
        reading_repo,
        alert_repo,
        report_repo,
        settings.reporting.clone(),
    ));
    let threshold_service = Arc::new(ThresholdService::new(preference_repo));

    let server_addr = settings.server_addr();
    let workers = if settings.server.workers == 0 {
        num_cpus::get()
    } else {
        settings.server.workers
    };

    info!("🚀 服务启动在 http://{}", server_addr);
    info!("📊 工作线程数: {}", workers);

    // 启动 HTTP 服务器
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec!["Content-Type", "X-Request-ID"])
            .expose_headers(vec!["Content-Disposition", "X-Request-ID", "X-Report-Id"])
            .max_age(3600);

        App::new()
            // 全局中间件
            .wrap(cors)
            .wrap(RequestLogger::new())
            .wrap(middleware::Compress::default())
            // 注入服务
            .app_data(web::Data::new(pg_pool.clone()))
            .app_data(web::Data::new(reading_service.clone()))
            .app_data(web::Data::new(alert_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(threshold_service.clone()))
            .configure(routes::configure)
    })
    .workers(workers)
    .bind(&server_addr)?
    .run()
    .await
}

/// 初始化日志系统
///
/// `RUST_LOG` 优先，否则使用配置中的级别；`format = "json"` 输出 JSON。
fn init_tracing(logging: &LoggingSettings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{},aquaguard=debug", logging.level))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}
