//! PDU 读数模型

use crate::models::{AlertReason, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// 单个 PDU 的一次采样
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MetricReading {
    pub pdu_id: String,
    pub rack_id: String,
    #[serde(default)]
    pub chain_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,

    /// 电流（A）
    #[serde(default, deserialize_with = "lenient_metric")]
    pub current: Option<f64>,
    /// 电压（V）
    #[serde(default, deserialize_with = "lenient_metric")]
    pub voltage: Option<f64>,
    /// 温度（°C），传感器缺失时为空
    #[serde(default, deserialize_with = "lenient_metric")]
    pub temperature: Option<f64>,
    /// 湿度（%），传感器缺失时为空
    #[serde(default, deserialize_with = "lenient_metric")]
    pub humidity: Option<f64>,

    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl MetricReading {
    pub fn new(pdu_id: impl Into<String>, rack_id: impl Into<String>) -> Self {
        Self {
            pdu_id: pdu_id.into(),
            rack_id: rack_id.into(),
            ..Default::default()
        }
    }

    /// 链路 ID（空字符串视为无链路）
    pub fn chain(&self) -> Option<&str> {
        self.chain_id.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMetric {
    Number(f64),
    Text(String),
}

/// 宽松解析指标值：数字、数字字符串、null 或 "N/A" 之类的不可用标记
fn lenient_metric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawMetric>::deserialize(deserializer)?;

    Ok(match raw {
        Some(RawMetric::Number(value)) if value.is_finite() => Some(value),
        Some(RawMetric::Text(text)) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// 读数状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl From<Severity> for ReadingStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => ReadingStatus::Warning,
            Severity::Critical => ReadingStatus::Critical,
        }
    }
}

/// 一次阈值突破的明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBreach {
    pub reason: AlertReason,
    pub value: f64,
    pub threshold: f64,
}

/// 分级结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub status: ReadingStatus,
    pub reasons: Vec<AlertReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaches: Vec<ThresholdBreach>,
}

impl ClassificationResult {
    pub fn normal() -> Self {
        Self::default()
    }

    /// 记录一次突破，状态取最严重者
    pub fn record(&mut self, breach: ThresholdBreach) {
        self.status = self.status.max(breach.reason.severity().into());
        self.reasons.push(breach.reason);
        self.breaches.push(breach);
    }

    pub fn breach_for(&self, reason: &AlertReason) -> Option<&ThresholdBreach> {
        self.breaches.iter().find(|b| &b.reason == reason)
    }
}

/// 带分级结果的读数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReading {
    #[serde(flatten)]
    pub reading: MetricReading,
    #[serde(flatten)]
    pub classification: ClassificationResult,
}

impl ClassifiedReading {
    pub fn new(reading: MetricReading, classification: ClassificationResult) -> Self {
        Self {
            reading,
            classification,
        }
    }

    /// 维护中的读数：直接视为正常
    pub fn excluded(reading: MetricReading) -> Self {
        Self::new(reading, ClassificationResult::normal())
    }

    pub fn status(&self) -> ReadingStatus {
        self.classification.status
    }

    pub fn reasons(&self) -> &[AlertReason] {
        &self.classification.reasons
    }
}
