//! 监控周期驱动
//!
//! 每个周期：读取最新读数 → 取阈值与维护快照 → 分级 → 告警对账。
//! 读取失败只放弃当前周期，下一个周期从头重试。

use crate::errors::AppError;
use crate::models::{
    ClassifiedReading, CycleReport, EvaluationSummary, MaintenanceSnapshot, MetricReading,
    ThresholdSnapshot,
};
use crate::repositories::{MaintenanceStore, ReadingSource, ThresholdStore};
use crate::services::{rack_evaluator, AlertLifecycleManager};
use chrono::Utc;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// 监控服务
pub struct MonitorService {
    reading_source: Arc<dyn ReadingSource>,
    threshold_store: Arc<dyn ThresholdStore>,
    maintenance_store: Arc<dyn MaintenanceStore>,
    lifecycle: Arc<AlertLifecycleManager>,
    interval: Duration,
}

impl MonitorService {
    pub fn new(
        reading_source: Arc<dyn ReadingSource>,
        threshold_store: Arc<dyn ThresholdStore>,
        maintenance_store: Arc<dyn MaintenanceStore>,
        lifecycle: Arc<AlertLifecycleManager>,
        interval: Duration,
    ) -> Self {
        Self {
            reading_source,
            threshold_store,
            maintenance_store,
            lifecycle,
            interval,
        }
    }

    /// 阈值快照：全局配置 + 本批机柜的覆盖配置（一次批量查询）
    pub async fn snapshot_thresholds(
        &self,
        readings: &[MetricReading],
    ) -> Result<ThresholdSnapshot, AppError> {
        let global = self.threshold_store.list_global().await?;

        let rack_ids: Vec<String> = readings
            .iter()
            .map(|r| r.rack_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let overrides = if rack_ids.is_empty() {
            Default::default()
        } else {
            self.threshold_store.list_overrides(&rack_ids).await?
        };

        Ok(ThresholdSnapshot::new(global, overrides))
    }

    /// 维护快照
    pub async fn snapshot_maintenance(&self) -> Result<MaintenanceSnapshot, AppError> {
        let racks = self.maintenance_store.list_rack_ids().await?;
        let chains = self.maintenance_store.list_chain_ids().await?;

        Ok(MaintenanceSnapshot::new(racks, chains))
    }

    /// 只分级不对账，供展示层使用
    pub async fn evaluate_current(
        &self,
    ) -> Result<(Vec<ClassifiedReading>, EvaluationSummary), AppError> {
        let (readings, thresholds, maintenance) = self.load_inputs().await?;
        let evaluation = rack_evaluator::evaluate(&readings, &thresholds, &maintenance);

        Ok((evaluation.readings, evaluation.summary))
    }

    async fn load_inputs(
        &self,
    ) -> Result<(Vec<MetricReading>, ThresholdSnapshot, MaintenanceSnapshot), AppError> {
        let readings = self.reading_source.latest_readings().await?;
        let thresholds = self.snapshot_thresholds(&readings).await?;
        let maintenance = self.snapshot_maintenance().await?;

        Ok((readings, thresholds, maintenance))
    }

    /// 执行一个完整周期
    pub async fn run_cycle(&self) -> Result<CycleReport, AppError> {
        let started_at = Utc::now();
        let timer = Instant::now();

        let (readings, thresholds, maintenance) = self.load_inputs().await.map_err(|e| {
            tracing::error!(error = %e, "读取周期输入失败，放弃本周期");
            e
        })?;

        let evaluation = rack_evaluator::evaluate(&readings, &thresholds, &maintenance);
        tracing::debug!(
            total = evaluation.summary.total,
            normal = evaluation.summary.normal,
            warning = evaluation.summary.warning,
            critical = evaluation.summary.critical,
            excluded = evaluation.summary.excluded,
            "分级完成"
        );

        let reconcile = self
            .lifecycle
            .reconcile(&evaluation.readings, &maintenance.racks)
            .await?;

        let report = CycleReport {
            started_at,
            duration_ms: timer.elapsed().as_millis() as u64,
            evaluation: evaluation.summary,
            reconcile,
        };

        tracing::info!(
            duration_ms = report.duration_ms,
            readings = report.evaluation.total,
            critical = report.evaluation.critical,
            warning = report.evaluation.warning,
            alerts_created = report.reconcile.created,
            alerts_refreshed = report.reconcile.refreshed,
            alerts_deleted = report.reconcile.deleted,
            alerts_failed = report.reconcile.failed,
            "监控周期完成"
        );

        Ok(report)
    }

    /// 按固定间隔循环执行，直到 `shutdown` 完成
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(interval_secs = self.interval.as_secs(), "监控任务启动");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("监控任务停止");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        tracing::warn!(error = %e, "监控周期失败，等待下个周期重试");
                    }
                }
            }
        }
    }
}
