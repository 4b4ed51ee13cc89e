//! PostgreSQL 连接池管理

use crate::config::{DatabaseSettings, Settings};
use crate::errors::AppError;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// PostgreSQL 连接池包装
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// 创建新的数据库连接池
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let database_url = Settings::database_url()?;

        let options = PgConnectOptions::from_str(database_url.expose_secret())
            .map_err(|e| AppError::ConfigError(format!("数据库 URL 无效: {}", e)))?
            .application_name(env!("CARGO_PKG_NAME"));

        let pool = Self::pool_options(&settings.database)
            .connect_with(Self::with_ssl(options, &settings.database))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "数据库连接失败");
                AppError::DatabaseError(e)
            })?;

        tracing::info!(
            max_connections = settings.database.max_connections,
            ssl = settings.database.require_ssl,
            "数据库连接池已创建"
        );

        Ok(Self { pool })
    }

    fn pool_options(db: &DatabaseSettings) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(db.max_connections)
            .min_connections(db.min_connections)
            .acquire_timeout(Duration::from_secs(db.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(db.idle_timeout_seconds))
    }

    fn with_ssl(options: PgConnectOptions, db: &DatabaseSettings) -> PgConnectOptions {
        if db.require_ssl {
            options.ssl_mode(PgSslMode::Require)
        } else {
            options
        }
    }

    /// 获取内部连接池引用
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::DatabaseError)
    }

    /// 运行数据库迁移
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalError(format!("迁移失败: {}", e)))?;

        tracing::info!("数据库迁移完成");
        Ok(())
    }
}
