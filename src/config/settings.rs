//! 应用配置加载和管理

use crate::errors::AppError;
use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use validator::Validate;

/// 应用配置结构
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub require_ssl: bool,
}

/// 监控周期配置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MonitorSettings {
    /// 轮询周期（秒）
    #[validate(range(min = 5, max = 86400, message = "轮询周期应在 5-86400 秒之间"))]
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// 每批处理的告警数
    #[validate(range(min = 1, max = 1000, message = "告警批大小应在 1-1000 之间"))]
    #[serde(default = "default_batch_size")]
    pub alert_batch_size: usize,
    /// 批次之间的停顿（毫秒）
    #[validate(range(max = 10000, message = "批次停顿不能超过 10000 毫秒"))]
    #[serde(default = "default_batch_pause")]
    pub batch_pause_ms: u64,
    /// 批内并发写入数
    #[validate(range(min = 1, max = 64, message = "并发写入数应在 1-64 之间"))]
    #[serde(default = "default_write_concurrency")]
    pub write_concurrency: usize,
    /// 启动时是否执行迁移
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            alert_batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause(),
            write_concurrency: default_write_concurrency(),
            run_migrations: true,
        }
    }
}

impl MonitorSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

fn default_interval() -> u64 { 60 }
fn default_batch_size() -> usize { 50 }
fn default_batch_pause() -> u64 { 100 }
fn default_write_concurrency() -> usize { 4 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl LoggingSettings {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Settings {
    /// 从配置文件和环境变量加载配置
    pub fn load() -> Result<Self, AppError> {
        let run_mode = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let settings = Config::builder()
            // 加载默认配置
            .add_source(File::with_name("config/default"))
            // 根据环境加载对应配置
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // 环境变量覆盖，前缀 RACKWATCH，分隔符 __
            .add_source(
                Environment::with_prefix("RACKWATCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.monitor.validate()?;

        Ok(settings)
    }

    /// 获取数据库连接 URL（从环境变量）
    pub fn database_url() -> Result<SecretString, AppError> {
        env::var("DATABASE_URL")
            .map(SecretString::new)
            .map_err(|_| AppError::ConfigError("DATABASE_URL 未设置".to_string()))
    }
}
