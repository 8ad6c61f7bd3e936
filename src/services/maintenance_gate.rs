//! 维护排除判断

use crate::models::{MaintenanceSnapshot, MetricReading};
use std::collections::HashSet;

/// 机柜是否被排除在分级之外
///
/// 机柜本身在维护中，或其链路整链维护时返回 true。空链路 ID 不参与匹配。
pub fn is_excluded(
    rack_id: &str,
    chain_id: Option<&str>,
    maintenance_racks: &HashSet<String>,
    maintenance_chains: &HashSet<String>,
) -> bool {
    if maintenance_racks.contains(rack_id) {
        return true;
    }

    match chain_id {
        Some(chain) if !chain.is_empty() => maintenance_chains.contains(chain),
        _ => false,
    }
}

/// 按快照判断读数是否被排除
pub fn excludes(snapshot: &MaintenanceSnapshot, reading: &MetricReading) -> bool {
    is_excluded(
        &reading.rack_id,
        reading.chain(),
        &snapshot.racks,
        &snapshot.chains,
    )
}
