//! 监控周期集成测试

use crate::helpers;
use crate::mocks::{
    InMemoryAlertStore, InMemoryMaintenanceStore, InMemoryReadingSource, InMemoryThresholdStore,
};
use crate::{assert_err, assert_ok};
use rackwatch::models::{MetricType, ReadingStatus};
use rackwatch::services::{AlertLifecycleManager, MonitorService};
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    readings: Arc<InMemoryReadingSource>,
    thresholds: Arc<InMemoryThresholdStore>,
    maintenance: Arc<InMemoryMaintenanceStore>,
    alerts: Arc<InMemoryAlertStore>,
    monitor: MonitorService,
}

fn fixture(readings: Vec<rackwatch::models::MetricReading>) -> Fixture {
    let readings = InMemoryReadingSource::new(readings);
    let thresholds = InMemoryThresholdStore::new(helpers::full_thresholds());
    let maintenance = InMemoryMaintenanceStore::new();
    let alerts = InMemoryAlertStore::new();

    let lifecycle = Arc::new(AlertLifecycleManager::with_options(
        alerts.clone(),
        10,
        Duration::ZERO,
        4,
    ));
    let monitor = MonitorService::new(
        readings.clone(),
        thresholds.clone(),
        maintenance.clone(),
        lifecycle,
        Duration::from_secs(60),
    );

    Fixture {
        readings,
        thresholds,
        maintenance,
        alerts,
        monitor,
    }
}

#[tokio::test]
async fn test_cycle_uses_one_batched_override_lookup() {
    let f = fixture(vec![
        helpers::voltage_reading("P1", "R2", 230.0),
        helpers::voltage_reading("P2", "R1", 230.0),
        helpers::voltage_reading("P3", "R1", 230.0),
        helpers::voltage_reading("P4", "R3", 230.0),
    ]);

    let report = assert_ok!(f.monitor.run_cycle().await);

    assert_eq!(report.evaluation.total, 4);
    assert_eq!(report.evaluation.normal, 4);
    assert_eq!(f.thresholds.override_calls(), 1);
    assert_eq!(
        f.thresholds.requested_racks(),
        vec![vec!["R1".to_string(), "R2".to_string(), "R3".to_string()]]
    );
}

#[tokio::test]
async fn test_cycle_applies_overrides_and_creates_alerts() {
    let f = fixture(vec![
        helpers::voltage_reading("P1", "R1", 195.0),
        helpers::voltage_reading("P2", "R2", 195.0),
    ]);
    f.thresholds.set_override("R1", "critical_voltage_low", 190.0);
    f.thresholds.set_override("R1", "warning_voltage_low", 192.0);

    let report = assert_ok!(f.monitor.run_cycle().await);

    assert_eq!(report.evaluation.normal, 1);
    assert_eq!(report.evaluation.critical, 1);
    assert_eq!(report.reconcile.created, 1);
    assert!(f
        .alerts
        .get("P2", MetricType::Voltage, "critical_voltage_low")
        .is_some());
    assert!(f.alerts.list_for_pdu_sync("P1").is_empty());
}

#[tokio::test]
async fn test_threshold_change_takes_effect_next_cycle() {
    let f = fixture(vec![helpers::voltage_reading("P1", "R1", 205.0)]);

    let report = assert_ok!(f.monitor.run_cycle().await);
    assert_eq!(report.evaluation.warning, 1);
    assert_eq!(f.alerts.count(), 0);

    f.thresholds.set_global("critical_voltage_low", 206.0);
    let report = assert_ok!(f.monitor.run_cycle().await);
    assert_eq!(report.evaluation.critical, 1);
    assert_eq!(f.alerts.count(), 1);
}

#[tokio::test]
async fn test_chain_maintenance_clears_alerts() {
    let mut chained = helpers::voltage_reading("P1", "R3", 150.0);
    chained.chain_id = Some("C1".to_string());
    let f = fixture(vec![chained, helpers::voltage_reading("P2", "R4", 150.0)]);

    let report = assert_ok!(f.monitor.run_cycle().await);
    assert_eq!(report.reconcile.created, 2);

    // 同一次维护登记了 C1 下的两个机柜，整链进入维护
    let action = helpers::fixed_uuid(7);
    f.maintenance.register(action, "R1", Some("C1"));
    f.maintenance.register(action, "R2", Some("C1"));

    let report = assert_ok!(f.monitor.run_cycle().await);
    assert_eq!(report.evaluation.excluded, 1);
    assert_eq!(report.reconcile.deleted, 1);
    assert!(f.alerts.list_for_pdu_sync("P1").is_empty());
    assert_eq!(f.alerts.list_for_pdu_sync("P2").len(), 1);
}

#[tokio::test]
async fn test_read_failure_abandons_cycle_without_writes() {
    let f = fixture(vec![helpers::voltage_reading("P1", "R1", 150.0)]);
    f.thresholds.set_offline(true);

    let error = assert_err!(f.monitor.run_cycle().await);
    assert!(error.is_store_unavailable());
    assert_eq!(f.alerts.upsert_count(), 0);
    assert_eq!(f.alerts.delete_count(), 0);

    f.thresholds.set_offline(false);
    let report = assert_ok!(f.monitor.run_cycle().await);
    assert_eq!(report.reconcile.created, 1);
}

#[tokio::test]
async fn test_pdu_leaving_input_resolves_alert() {
    let f = fixture(vec![helpers::voltage_reading("P1", "R1", 150.0)]);
    assert_ok!(f.monitor.run_cycle().await);
    assert_eq!(f.alerts.count(), 1);

    f.readings.replace(vec![]);
    let report = assert_ok!(f.monitor.run_cycle().await);
    assert_eq!(report.reconcile.deleted, 1);
    assert_eq!(f.thresholds.override_calls(), 1, "空批次不查询覆盖配置");
}

#[tokio::test]
async fn test_evaluate_current_has_no_side_effects() {
    let f = fixture(vec![helpers::voltage_reading("P1", "R1", 150.0)]);

    let (readings, summary) = assert_ok!(f.monitor.evaluate_current().await);
    assert_eq!(readings[0].status(), ReadingStatus::Critical);
    assert_eq!(summary.critical, 1);
    assert_eq!(f.alerts.upsert_count(), 0);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let f = fixture(vec![helpers::voltage_reading("P1", "R1", 150.0)]);

    let finished = tokio::time::timeout(
        Duration::from_secs(5),
        f.monitor
            .run(tokio::time::sleep(Duration::from_millis(50))),
    )
    .await;

    assert!(finished.is_ok(), "关闭信号后应退出");
    // 第一个 tick 立即触发
    assert_eq!(f.alerts.count(), 1);
}
