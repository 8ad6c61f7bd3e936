//! 严重告警生命周期
//!
//! 每个周期都以全新计算的严重集合对持久化告警做一次完整对账：
//! 新出现的原因插入，持续的原因刷新，其余全部删除。

use crate::config::MonitorSettings;
use crate::errors::AppError;
use crate::models::{
    ActiveAlertSet, AlertCandidate, AlertKey, AlertRecord, ClassifiedReading, MetricType,
    ReadingStatus, ReconcileSummary,
};
use crate::repositories::AlertStore;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// 对账计划
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// 当前严重集合（PDU → 原因代码），包含预警原因
    pub active: ActiveAlertSet,
    /// 需要写入的严重告警，同一唯一键只出现一次
    pub candidates: Vec<AlertCandidate>,
}

/// 由分级结果生成对账计划（纯函数）
pub fn plan(readings: &[ClassifiedReading], maintenance_racks: &HashSet<String>) -> ReconcilePlan {
    let mut active = ActiveAlertSet::default();
    let mut candidates: Vec<AlertCandidate> = Vec::new();
    let mut positions: HashMap<AlertKey, usize> = HashMap::new();

    let critical = readings.iter().filter(|r| {
        r.status() == ReadingStatus::Critical
            && !r.reasons().is_empty()
            && !maintenance_racks.contains(&r.reading.rack_id)
    });

    for classified in critical {
        let pdu_id = classified.reading.pdu_id.as_str();

        for reason in classified.reasons() {
            active.insert(pdu_id, reason);

            if !reason.is_critical() {
                continue;
            }

            let metric_type = reason.metric_type();
            let breach = classified.classification.breach_for(reason);
            let alert_value = match breach
                .map(|b| b.value)
                .or_else(|| metric_value(classified, metric_type))
            {
                Some(value) => value,
                None => {
                    tracing::warn!(
                        pdu_id = %pdu_id,
                        reason = %reason,
                        "告警原因缺少对应读数，跳过"
                    );
                    continue;
                }
            };

            let candidate = AlertCandidate {
                key: AlertKey {
                    pdu_id: pdu_id.to_string(),
                    metric_type,
                    reason: *reason,
                },
                rack_id: classified.reading.rack_id.clone(),
                alert_value,
                threshold_exceeded: breach.map(|b| b.threshold),
            };

            // 同一唯一键在一个周期内只写一次，后出现的读数覆盖前者
            match positions.get(&candidate.key) {
                Some(&index) => candidates[index] = candidate,
                None => {
                    positions.insert(candidate.key.clone(), candidates.len());
                    candidates.push(candidate);
                }
            }
        }
    }

    ReconcilePlan { active, candidates }
}

fn metric_value(classified: &ClassifiedReading, metric_type: MetricType) -> Option<f64> {
    let reading = &classified.reading;
    match metric_type {
        MetricType::Current => reading.current,
        MetricType::Voltage => reading.voltage,
        MetricType::Temperature => reading.temperature,
        MetricType::Humidity => reading.humidity,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Created,
    Refreshed,
}

/// 告警生命周期管理
pub struct AlertLifecycleManager {
    alert_store: Arc<dyn AlertStore>,
    batch_size: usize,
    batch_pause: Duration,
    concurrency: usize,
    /// 上一个周期的对账完成前，下一个周期不会开始
    cycle_lock: Mutex<()>,
}

impl AlertLifecycleManager {
    pub fn new(alert_store: Arc<dyn AlertStore>, settings: &MonitorSettings) -> Self {
        Self::with_options(
            alert_store,
            settings.alert_batch_size,
            settings.batch_pause(),
            settings.write_concurrency,
        )
    }

    pub fn with_options(
        alert_store: Arc<dyn AlertStore>,
        batch_size: usize,
        batch_pause: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            alert_store,
            batch_size: batch_size.max(1),
            batch_pause,
            concurrency: concurrency.max(1),
            cycle_lock: Mutex::new(()),
        }
    }

    /// 对账
    ///
    /// 单条告警写入失败只计数，不影响同批其余告警与清理步骤。
    /// 某批出现连接层面的失败时做一次健康检查，存储确实不可达才放弃本周期，
    /// 不做清理，由下个周期从头重试。
    pub async fn reconcile(
        &self,
        readings: &[ClassifiedReading],
        maintenance_racks: &HashSet<String>,
    ) -> Result<ReconcileSummary, AppError> {
        let _guard = self.cycle_lock.lock().await;

        let plan = plan(readings, maintenance_racks);
        let mut summary = ReconcileSummary {
            critical_pdus: plan.active.pdu_count(),
            candidates: plan.candidates.len(),
            ..Default::default()
        };

        for (index, batch) in plan.candidates.chunks(self.batch_size).enumerate() {
            if index > 0 && !self.batch_pause.is_zero() {
                tokio::time::sleep(self.batch_pause).await;
            }

            let now = Utc::now();
            let outcomes: Vec<(&AlertCandidate, Result<WriteOutcome, AppError>)> =
                stream::iter(batch)
                    .map(|candidate| async move {
                        (candidate, self.write_one(candidate, now).await)
                    })
                    .buffer_unordered(self.concurrency)
                    .collect()
                    .await;

            let mut unavailable = 0;

            for (candidate, outcome) in outcomes {
                match outcome {
                    Ok(WriteOutcome::Created) => summary.created += 1,
                    Ok(WriteOutcome::Refreshed) => summary.refreshed += 1,
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(
                            alert = %candidate.key,
                            error = %e,
                            "告警写入失败"
                        );
                        if e.is_store_unavailable() {
                            unavailable += 1;
                        }
                    }
                }
            }

            if unavailable > 0 {
                if let Err(e) = self.alert_store.health_check().await {
                    tracing::error!(
                        batch = index,
                        unavailable,
                        failed = summary.failed,
                        error = %e,
                        "告警存储不可用，放弃本周期对账"
                    );
                    return Err(e);
                }
                tracing::warn!(batch = index, unavailable, "存储健康检查通过，继续对账");
            }
        }

        summary.deleted = self
            .alert_store
            .delete_stale(&plan.active)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "清理已恢复告警失败");
                e
            })?;

        tracing::info!(
            critical_pdus = summary.critical_pdus,
            candidates = summary.candidates,
            created = summary.created,
            refreshed = summary.refreshed,
            failed = summary.failed,
            deleted = summary.deleted,
            "告警对账完成"
        );

        Ok(summary)
    }

    async fn write_one(
        &self,
        candidate: &AlertCandidate,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, AppError> {
        match self.alert_store.find(&candidate.key).await? {
            Some(existing) => {
                self.alert_store
                    .upsert(&existing.refreshed(candidate, now))
                    .await?;
                Ok(WriteOutcome::Refreshed)
            }
            None => {
                self.alert_store
                    .upsert(&AlertRecord::open(candidate, now))
                    .await?;
                tracing::debug!(alert = %candidate.key, value = candidate.alert_value, "新告警");
                Ok(WriteOutcome::Created)
            }
        }
    }

    /// 全部活跃告警
    pub async fn active_alerts(&self) -> Result<Vec<AlertRecord>, AppError> {
        let records = self.alert_store.list_active().await?;

        for record in records.iter().filter(|r| r.reason().is_none()) {
            tracing::warn!(
                alert_id = %record.id,
                pdu_id = %record.pdu_id,
                reason = %record.alert_reason,
                "无法识别的告警原因代码"
            );
        }

        Ok(records)
    }

    /// 单个 PDU 的活跃告警
    pub async fn alerts_for_pdu(&self, pdu_id: &str) -> Result<Vec<AlertRecord>, AppError> {
        self.alert_store.list_for_pdu(pdu_id).await
    }
}
