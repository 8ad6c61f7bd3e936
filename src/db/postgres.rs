//! PostgreSQL 连接池管理

use crate::config::{DatabaseSettings, Settings};
use crate::errors::AppError;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// 连接上报给服务端的应用名，便于在 pg_stat_activity 中区分监控进程
const APPLICATION_NAME: &str = "rackwatch";

/// PostgreSQL 连接池包装
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// 按配置创建连接池
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let database_url = Settings::database_url()?;
        let options = connect_options(database_url.expose_secret(), &settings.database)?;

        let pool = pool_options(&settings.database)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "数据库连接失败");
                AppError::DatabaseError(e)
            })?;

        tracing::info!(
            max_connections = settings.database.max_connections,
            require_ssl = settings.database.require_ssl,
            "数据库连接池已创建"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 健康检查
    ///
    /// 失败一律视为存储不可用，告警对账据此决定是否放弃本周期。
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(error = %e, "数据库健康检查失败");
                AppError::StoreUnavailable(e.to_string())
            })
    }

    /// 运行内嵌迁移（阈值、维护、读数、活跃告警表）
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalError(format!("迁移失败: {}", e)))
    }
}

/// 解析连接串并应用 SSL 与应用名
fn connect_options(url: &str, database: &DatabaseSettings) -> Result<PgConnectOptions, AppError> {
    let mut options = PgConnectOptions::from_str(url)
        .map_err(|e| AppError::ConfigError(format!("数据库 URL 无效: {}", e)))?
        .application_name(APPLICATION_NAME);

    if database.require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }

    Ok(options)
}

fn pool_options(database: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .acquire_timeout(Duration::from_secs(database.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(database.idle_timeout_seconds))
}
