//! Rackwatch - 机柜 PDU 监控与告警核心
//!
//! 周期性分级 PDU 读数并维护活跃告警表

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rackwatch::{
    config::{LoggingSettings, Settings},
    db::PostgresPool,
    repositories::{AlertRepository, MaintenanceRepository, ReadingRepository, ThresholdRepository},
    services::{AlertLifecycleManager, MonitorService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let settings = Settings::load().context("配置加载失败")?;

    // 初始化日志
    init_tracing(&settings.logging);

    info!("🌱 Rackwatch 启动中...");

    // 连接数据库
    let pg_pool = PostgresPool::new(&settings)
        .await
        .context("数据库连接失败")?;
    pg_pool.health_check().await.context("数据库健康检查失败")?;
    info!("✅ 数据库连接成功");

    if settings.monitor.run_migrations {
        pg_pool.run_migrations().await.context("数据库迁移失败")?;
        info!("✅ 数据库迁移完成");
    }

    // 初始化仓库
    let reading_repo = Arc::new(ReadingRepository::new(pg_pool.clone()));
    let threshold_repo = Arc::new(ThresholdRepository::new(pg_pool.clone()));
    let maintenance_repo = Arc::new(MaintenanceRepository::new(pg_pool.clone()));
    let alert_repo = Arc::new(AlertRepository::new(pg_pool.clone()));

    // 初始化服务
    let lifecycle = Arc::new(AlertLifecycleManager::new(alert_repo, &settings.monitor));
    let monitor = MonitorService::new(
        reading_repo,
        threshold_repo,
        maintenance_repo,
        lifecycle,
        settings.monitor.interval(),
    );

    info!(
        interval_secs = settings.monitor.interval_seconds,
        batch_size = settings.monitor.alert_batch_size,
        "🚀 监控任务已就绪"
    );

    monitor.run(shutdown_signal()).await;

    info!("👋 Rackwatch 已退出");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "无法监听退出信号");
        std::future::pending::<()>().await;
    }
}

/// 初始化日志系统
fn init_tracing(logging: &LoggingSettings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rackwatch=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}
