//! 活跃告警模型

use crate::errors::AppError;
use crate::models::{MetricType, Severity, ThresholdKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const ZERO_CURRENT_CODE: &str = "critical_amperage_zero_reading";

/// 告警原因代码
///
/// 除零电流外，原因代码与被突破的阈值键同名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlertReason {
    /// 电流读数为 0，视为疑似故障
    ZeroCurrent,
    Threshold(ThresholdKey),
}

impl AlertReason {
    pub fn severity(&self) -> Severity {
        match self {
            AlertReason::ZeroCurrent => Severity::Critical,
            AlertReason::Threshold(key) => key.severity,
        }
    }

    pub fn metric_type(&self) -> MetricType {
        match self {
            AlertReason::ZeroCurrent => MetricType::Current,
            AlertReason::Threshold(key) => key.metric,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity() == Severity::Critical
    }
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertReason::ZeroCurrent => f.write_str(ZERO_CURRENT_CODE),
            AlertReason::Threshold(key) => fmt::Display::fmt(key, f),
        }
    }
}

impl FromStr for AlertReason {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ZERO_CURRENT_CODE {
            return Ok(AlertReason::ZeroCurrent);
        }
        s.parse::<ThresholdKey>()
            .map(AlertReason::Threshold)
            .map_err(|_| AppError::ValidationError(format!("未知的告警原因: {}", s)))
    }
}

impl TryFrom<String> for AlertReason {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlertReason> for String {
    fn from(reason: AlertReason) -> Self {
        reason.to_string()
    }
}

/// 告警唯一键 `(pdu_id, metric_type, alert_reason)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub pdu_id: String,
    pub metric_type: MetricType,
    pub reason: AlertReason,
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.pdu_id, self.metric_type, self.reason)
    }
}

/// 本周期需要写入的告警
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub key: AlertKey,
    pub rack_id: String,
    pub alert_value: f64,
    pub threshold_exceeded: Option<f64>,
}

/// 持久化的活跃告警
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AlertRecord {
    pub id: Uuid,
    pub pdu_id: String,
    pub rack_id: String,
    pub metric_type: MetricType,
    pub alert_reason: String,
    pub alert_value: f64,
    pub threshold_exceeded: Option<f64>,
    /// 首次检测时间，刷新时保持不变
    pub alert_started_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl AlertRecord {
    /// 首次检测到的告警
    pub fn open(candidate: &AlertCandidate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pdu_id: candidate.key.pdu_id.clone(),
            rack_id: candidate.rack_id.clone(),
            metric_type: candidate.key.metric_type,
            alert_reason: candidate.key.reason.to_string(),
            alert_value: candidate.alert_value,
            threshold_exceeded: candidate.threshold_exceeded,
            alert_started_at: now,
            last_updated_at: now,
        }
    }

    /// 告警持续：刷新数值与更新时间
    pub fn refreshed(mut self, candidate: &AlertCandidate, now: DateTime<Utc>) -> Self {
        self.rack_id = candidate.rack_id.clone();
        self.alert_value = candidate.alert_value;
        self.threshold_exceeded = candidate.threshold_exceeded;
        self.last_updated_at = now;
        self
    }

    /// 解析存储的原因代码，未知代码返回 `None`
    pub fn reason(&self) -> Option<AlertReason> {
        self.alert_reason.parse().ok()
    }

    pub fn matches(&self, key: &AlertKey) -> bool {
        self.pdu_id == key.pdu_id
            && self.metric_type == key.metric_type
            && self.alert_reason == key.reason.to_string()
    }
}

/// 当前严重集合：每个 PDU 当前的原因代码
///
/// 不在集合中的持久化告警即为已恢复，应被删除。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveAlertSet {
    by_pdu: HashMap<String, HashSet<String>>,
}

impl ActiveAlertSet {
    pub fn insert(&mut self, pdu_id: &str, reason: &AlertReason) {
        self.by_pdu
            .entry(pdu_id.to_string())
            .or_default()
            .insert(reason.to_string());
    }

    pub fn contains(&self, pdu_id: &str, reason_code: &str) -> bool {
        self.by_pdu
            .get(pdu_id)
            .map(|reasons| reasons.contains(reason_code))
            .unwrap_or(false)
    }

    /// 删除条件：PDU 已不在严重集合中，或该原因已不在其原因列表中
    pub fn is_stale(&self, record: &AlertRecord) -> bool {
        !self.contains(&record.pdu_id, &record.alert_reason)
    }

    pub fn pdu_count(&self) -> usize {
        self.by_pdu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pdu.is_empty()
    }

    /// 展开为并列数组 `(pdu_ids, reason_codes)`，用于 SQL `UNNEST`
    pub fn to_columns(&self) -> (Vec<String>, Vec<String>) {
        self.by_pdu
            .iter()
            .flat_map(|(pdu, reasons)| reasons.iter().map(move |r| (pdu.clone(), r.clone())))
            .unzip()
    }
}

/// 单次对账的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub critical_pdus: usize,
    pub candidates: usize,
    pub created: usize,
    pub refreshed: usize,
    pub failed: usize,
    pub deleted: u64,
}
