//! 应用配置加载和管理

use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// 应用配置结构
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub alerting: AlertingSettings,
    #[serde(default)]
    pub reporting: ReportingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub require_ssl: bool,
    /// 启动时自动执行迁移
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    /// `pretty` 或 `json`
    pub format: String,
}

/// 重复预警策略
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 每条越限读数都生成新预警
    AlwaysCreate,
    /// 同一传感器同一参数存在活跃预警时不再重复生成
    #[default]
    SuppressWhileActive,
}

/// 预警配置
#[derive(Debug, Clone, Deserialize)]
pub struct AlertingSettings {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// 获取传感器和阈值上下文的超时时间（秒）
    #[serde(default = "default_context_timeout")]
    pub context_timeout_seconds: u64,
}

impl Default for AlertingSettings {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            context_timeout_seconds: default_context_timeout(),
        }
    }
}

impl AlertingSettings {
    pub fn context_timeout(&self) -> Duration {
        Duration::from_secs(self.context_timeout_seconds)
    }
}

/// 报表配置
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingSettings {
    /// 单次数据拉取的超时时间（秒）
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
    /// 报表时间窗口上限（天）
    #[serde(default = "default_max_range_days")]
    pub max_range_days: i64,
    /// 单次报表最多读取的行数
    #[serde(default = "default_max_rows")]
    pub max_rows: i64,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout(),
            max_range_days: default_max_range_days(),
            max_rows: default_max_rows(),
        }
    }
}

impl ReportingSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

fn default_true() -> bool { true }
fn default_context_timeout() -> u64 { 5 }
fn default_fetch_timeout() -> u64 { 30 }
fn default_max_range_days() -> i64 { 366 }
fn default_max_rows() -> i64 { 50_000 }

impl Settings {
    /// 从配置文件和环境变量加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let settings = Config::builder()
            // 加载默认配置
            .add_source(File::with_name("config/development"))
            // 根据环境加载对应配置
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // 环境变量覆盖，前缀 AQUA，分隔符 __
            .add_source(
                Environment::with_prefix("AQUA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// 获取数据库连接 URL（从环境变量）
    pub fn database_url() -> Result<SecretString, ConfigError> {
        env::var("DATABASE_URL")
            .map(SecretString::new)
            .map_err(|_| ConfigError::NotFound("DATABASE_URL".to_string()))
    }

    /// 获取服务器地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
