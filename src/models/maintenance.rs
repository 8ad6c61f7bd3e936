//! 维护模型

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// 一次维护操作登记的机柜
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MaintenanceEntry {
    pub maintenance_id: Uuid,
    pub rack_id: String,
    pub chain_id: Option<String>,
}

/// 单个周期的维护快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaintenanceSnapshot {
    pub racks: HashSet<String>,
    pub chains: HashSet<String>,
}

impl MaintenanceSnapshot {
    pub fn new(racks: HashSet<String>, chains: HashSet<String>) -> Self {
        Self { racks, chains }
    }

    /// 由维护登记推导机柜集合与链路集合
    pub fn from_entries(entries: &[MaintenanceEntry]) -> Self {
        Self {
            racks: entries.iter().map(|e| e.rack_id.clone()).collect(),
            chains: chains_in_maintenance(entries),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.racks.is_empty() && self.chains.is_empty()
    }
}

/// 整链维护的链路：同一次维护登记了该链路下一个以上的不同机柜
fn chains_in_maintenance(entries: &[MaintenanceEntry]) -> HashSet<String> {
    let mut racks_per_action: HashMap<(Uuid, &str), HashSet<&str>> = HashMap::new();

    for entry in entries {
        let Some(chain) = entry.chain_id.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        racks_per_action
            .entry((entry.maintenance_id, chain))
            .or_default()
            .insert(entry.rack_id.as_str());
    }

    racks_per_action
        .into_iter()
        .filter(|(_, racks)| racks.len() > 1)
        .map(|((_, chain), _)| chain.to_string())
        .collect()
}
