//! 周期统计

use crate::models::{ClassifiedReading, ReadingStatus, ReconcileSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 分级结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationSummary {
    pub total: usize,
    pub normal: usize,
    pub warning: usize,
    pub critical: usize,
    /// 因维护而跳过分级的读数（同时计入 normal）
    pub excluded: usize,
}

impl EvaluationSummary {
    pub fn from_readings(readings: &[ClassifiedReading], excluded: usize) -> Self {
        let mut summary = Self {
            total: readings.len(),
            excluded,
            ..Default::default()
        };

        for reading in readings {
            match reading.status() {
                ReadingStatus::Normal => summary.normal += 1,
                ReadingStatus::Warning => summary.warning += 1,
                ReadingStatus::Critical => summary.critical += 1,
            }
        }

        summary
    }
}

/// 单个监控周期的报告
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub evaluation: EvaluationSummary,
    pub reconcile: ReconcileSummary,
}
