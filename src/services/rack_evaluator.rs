//! 批量分级：阈值合并 + 维护排除 + 指标分级

use crate::models::{
    ClassifiedReading, EffectiveThresholds, EvaluationSummary, MaintenanceSnapshot, MetricReading,
    MetricType, Phase, ThresholdSnapshot,
};
use crate::services::{classifier, maintenance_gate, threshold_resolver};
use std::collections::{HashMap, HashSet};

/// 分级结果
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub readings: Vec<ClassifiedReading>,
    pub summary: EvaluationSummary,
}

/// 对一批读数分级
///
/// 维护中的机柜跳过分级，直接输出正常状态。单个机柜的覆盖配置无效时
/// 回退为全局阈值，不影响其余机柜。
pub fn evaluate(
    readings: &[MetricReading],
    thresholds: &ThresholdSnapshot,
    maintenance: &MaintenanceSnapshot,
) -> Evaluation {
    let mut per_rack: HashMap<&str, EffectiveThresholds> = HashMap::new();
    let mut reported: HashSet<(&str, MetricType)> = HashSet::new();
    let mut classified = Vec::with_capacity(readings.len());
    let mut excluded = 0;

    for reading in readings {
        if maintenance_gate::excludes(maintenance, reading) {
            excluded += 1;
            classified.push(ClassifiedReading::excluded(reading.clone()));
            continue;
        }

        let rack_id = reading.rack_id.as_str();
        let effective = per_rack
            .entry(rack_id)
            .or_insert_with(|| effective_for_rack(thresholds, rack_id));

        let phase = Phase::normalize(reading.phase.as_deref());
        for metric in effective.incomplete_metrics(phase) {
            if reported.insert((rack_id, metric)) {
                tracing::warn!(
                    rack_id = %rack_id,
                    metric = %metric,
                    "阈值配置不完整，跳过该指标"
                );
            }
        }

        let result = classifier::classify(reading, effective);
        classified.push(ClassifiedReading::new(reading.clone(), result));
    }

    let summary = EvaluationSummary::from_readings(&classified, excluded);

    Evaluation {
        readings: classified,
        summary,
    }
}

fn effective_for_rack(thresholds: &ThresholdSnapshot, rack_id: &str) -> EffectiveThresholds {
    match threshold_resolver::resolve(&thresholds.global, &thresholds.overrides, rack_id) {
        Ok(effective) => effective,
        Err(e) => {
            tracing::warn!(
                rack_id = %rack_id,
                error = %e,
                "机柜阈值解析失败，回退为全局阈值"
            );
            threshold_resolver::global_only(&thresholds.global)
        }
    }
}
