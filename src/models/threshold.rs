//! 阈值模型
//!
//! 阈值键是固定的词汇表，例如 `critical_voltage_low`、
//! `warning_amperage_high_3_phase`。严重告警原因与被突破的阈值键同名，
//! 因此 [`ThresholdKey`] 同时承担原因代码的角色。

use crate::errors::AppError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// 阈值严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// 指标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "metric_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Current,
    Voltage,
    Temperature,
    Humidity,
}

impl MetricType {
    pub const ALL: [MetricType; 4] = [
        MetricType::Current,
        MetricType::Temperature,
        MetricType::Humidity,
        MetricType::Voltage,
    ];

    /// 阈值键中使用的指标片段（电流在键中称为 amperage）
    pub fn key_segment(&self) -> &'static str {
        match self {
            MetricType::Current => "amperage",
            MetricType::Voltage => "voltage",
            MetricType::Temperature => "temperature",
            MetricType::Humidity => "humidity",
        }
    }

    fn from_key_segment(segment: &str) -> Option<Self> {
        match segment {
            "amperage" => Some(MetricType::Current),
            "voltage" => Some(MetricType::Voltage),
            "temperature" => Some(MetricType::Temperature),
            "humidity" => Some(MetricType::Humidity),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Current => "current",
            MetricType::Voltage => "voltage",
            MetricType::Temperature => "temperature",
            MetricType::Humidity => "humidity",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 阈值边界方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Low,
    High,
}

impl Bound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::Low => "low",
            Bound::High => "high",
        }
    }
}

/// 供电相位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    #[serde(rename = "single_phase")]
    SinglePhase,
    #[serde(rename = "3_phase")]
    ThreePhase,
}

static THREE_PHASE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(3|three|tri)(phase|ph|p)?$").expect("三相匹配正则无效"));

static SINGLE_PHASE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(1|single|one|mono)(phase|ph|p)?$").expect("单相匹配正则无效"));

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(critical|warning)_(amperage|voltage|temperature|humidity)_(low|high)(?:_(single_phase|3_phase))?$",
    )
    .expect("阈值键正则无效")
});

impl Phase {
    /// 规范化相位描述（忽略大小写与标点），无法识别时视为单相
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Phase::SinglePhase;
        };

        let compact: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if THREE_PHASE_PATTERN.is_match(&compact) {
            Phase::ThreePhase
        } else if SINGLE_PHASE_PATTERN.is_match(&compact) {
            Phase::SinglePhase
        } else {
            tracing::debug!(phase = raw, "无法识别的相位，按单相处理");
            Phase::SinglePhase
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::SinglePhase => "single_phase",
            Phase::ThreePhase => "3_phase",
        }
    }
}

/// 阈值键
///
/// 仅电流键带相位后缀，其他指标的 `phase` 恒为 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThresholdKey {
    pub severity: Severity,
    pub metric: MetricType,
    pub bound: Bound,
    pub phase: Option<Phase>,
}

impl ThresholdKey {
    pub fn new(severity: Severity, metric: MetricType, bound: Bound, phase: Phase) -> Self {
        let phase = match metric {
            MetricType::Current => Some(phase),
            _ => None,
        };
        Self {
            severity,
            metric,
            bound,
            phase,
        }
    }
}

impl fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.severity.as_str(),
            self.metric.key_segment(),
            self.bound.as_str()
        )?;
        if let Some(phase) = self.phase {
            write!(f, "_{}", phase.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for ThresholdKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidThreshold(format!("未知的阈值键: {}", s));
        let caps = KEY_PATTERN.captures(s).ok_or_else(invalid)?;

        let severity = match &caps[1] {
            "critical" => Severity::Critical,
            _ => Severity::Warning,
        };
        let metric = MetricType::from_key_segment(&caps[2]).ok_or_else(invalid)?;
        let bound = match &caps[3] {
            "low" => Bound::Low,
            _ => Bound::High,
        };
        let phase = caps.get(4).map(|m| match m.as_str() {
            "3_phase" => Phase::ThreePhase,
            _ => Phase::SinglePhase,
        });

        // 电流键必须带相位，其他指标不允许带相位
        match (metric, phase) {
            (MetricType::Current, Some(_)) => {}
            (MetricType::Current, None) => return Err(invalid()),
            (_, Some(_)) => return Err(invalid()),
            (_, None) => {}
        }

        Ok(Self {
            severity,
            metric,
            bound,
            phase,
        })
    }
}

/// 阈值配置项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ThresholdSetting {
    pub key: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ThresholdSetting {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
            unit: None,
        }
    }
}

/// 单个指标的四个边界
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBand {
    pub critical_low: f64,
    pub critical_high: f64,
    pub warning_low: f64,
    pub warning_high: f64,
}

impl MetricBand {
    pub fn all_positive(&self) -> bool {
        self.critical_low > 0.0
            && self.critical_high > 0.0
            && self.warning_low > 0.0
            && self.warning_high > 0.0
    }
}

/// 机柜生效阈值（全局配置合并机柜覆盖后的结果）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectiveThresholds {
    values: BTreeMap<String, f64>,
}

impl EffectiveThresholds {
    pub fn new(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }

    pub fn from_settings(settings: &[ThresholdSetting]) -> Self {
        Self {
            values: settings
                .iter()
                .map(|s| (s.key.clone(), s.value))
                .collect(),
        }
    }

    pub fn get(&self, key: &ThresholdKey) -> Option<f64> {
        self.values.get(&key.to_string()).copied()
    }

    pub fn get_raw(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// 取指标的四个边界，任一缺失则返回 `None`
    pub fn band(&self, metric: MetricType, phase: Phase) -> Option<MetricBand> {
        let value = |severity, bound| self.get(&ThresholdKey::new(severity, metric, bound, phase));

        Some(MetricBand {
            critical_low: value(Severity::Critical, Bound::Low)?,
            critical_high: value(Severity::Critical, Bound::High)?,
            warning_low: value(Severity::Warning, Bound::Low)?,
            warning_high: value(Severity::Warning, Bound::High)?,
        })
    }

    /// 对指定相位而言配置不完整的指标
    ///
    /// 电压的零值阈值同样视为未配置。
    pub fn incomplete_metrics(&self, phase: Phase) -> Vec<MetricType> {
        MetricType::ALL
            .into_iter()
            .filter(|metric| match self.band(*metric, phase) {
                None => true,
                Some(band) => *metric == MetricType::Voltage && !band.all_positive(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 单个周期的阈值快照
#[derive(Debug, Clone, Default)]
pub struct ThresholdSnapshot {
    pub global: Vec<ThresholdSetting>,
    pub overrides: HashMap<String, Vec<ThresholdSetting>>,
}

impl ThresholdSnapshot {
    pub fn new(
        global: Vec<ThresholdSetting>,
        overrides: HashMap<String, Vec<ThresholdSetting>>,
    ) -> Self {
        Self { global, overrides }
    }
}
