//! 指标分级
//!
//! 四个指标各自独立判断，结果合并为一个总体状态（取最严重者）与原因列表。
//! 每个指标按 严重低 → 严重高 → 预警低 → 预警高 的顺序比较，命中即停止。
//!
//! 零值处理不对称：电流为 0 总是严重（疑似故障），电压为 0 或负值则跳过
//! （无供电与无负载是两回事）。

use crate::models::{
    AlertReason, Bound, ClassificationResult, EffectiveThresholds, MetricBand, MetricReading,
    MetricType, Phase, Severity, ThresholdBreach, ThresholdKey,
};

/// 对一条读数分级（纯函数）
pub fn classify(
    reading: &MetricReading,
    thresholds: &EffectiveThresholds,
) -> ClassificationResult {
    let phase = Phase::normalize(reading.phase.as_deref());
    let mut result = ClassificationResult::normal();

    let breaches = [
        classify_current(reading.current, phase, thresholds),
        classify_band(MetricType::Temperature, reading.temperature, thresholds),
        classify_band(MetricType::Humidity, reading.humidity, thresholds),
        classify_voltage(reading.voltage, thresholds),
    ];

    for breach in breaches.into_iter().flatten() {
        result.record(breach);
    }

    result
}

fn classify_current(
    value: Option<f64>,
    phase: Phase,
    thresholds: &EffectiveThresholds,
) -> Option<ThresholdBreach> {
    let value = value.filter(|v| v.is_finite())?;
    let band = thresholds.band(MetricType::Current, phase)?;

    if value == 0.0 {
        return Some(ThresholdBreach {
            reason: AlertReason::ZeroCurrent,
            value,
            threshold: 0.0,
        });
    }

    grade(MetricType::Current, phase, value, &band)
}

fn classify_band(
    metric: MetricType,
    value: Option<f64>,
    thresholds: &EffectiveThresholds,
) -> Option<ThresholdBreach> {
    let value = value.filter(|v| v.is_finite())?;
    let band = thresholds.band(metric, Phase::SinglePhase)?;

    grade(metric, Phase::SinglePhase, value, &band)
}

fn classify_voltage(
    value: Option<f64>,
    thresholds: &EffectiveThresholds,
) -> Option<ThresholdBreach> {
    let value = value.filter(|v| v.is_finite() && *v > 0.0)?;
    let band = thresholds.band(MetricType::Voltage, Phase::SinglePhase)?;

    // 零值阈值视为未配置
    if !band.all_positive() {
        return None;
    }

    grade(MetricType::Voltage, Phase::SinglePhase, value, &band)
}

fn grade(
    metric: MetricType,
    phase: Phase,
    value: f64,
    band: &MetricBand,
) -> Option<ThresholdBreach> {
    let (severity, bound, threshold) = if value <= band.critical_low {
        (Severity::Critical, Bound::Low, band.critical_low)
    } else if value >= band.critical_high {
        (Severity::Critical, Bound::High, band.critical_high)
    } else if value <= band.warning_low {
        (Severity::Warning, Bound::Low, band.warning_low)
    } else if value >= band.warning_high {
        (Severity::Warning, Bound::High, band.warning_high)
    } else {
        return None;
    };

    Some(ThresholdBreach {
        reason: AlertReason::Threshold(ThresholdKey::new(severity, metric, bound, phase)),
        value,
        threshold,
    })
}
