//! 阈值合并：全局配置 + 机柜覆盖

use crate::errors::AppError;
use crate::models::{EffectiveThresholds, ThresholdSetting};
use std::collections::{BTreeMap, HashMap};

/// 计算机柜的生效阈值
///
/// 覆盖值优先；仅存在于覆盖中的键原样保留。机柜没有覆盖时即为全局配置。
/// 覆盖值不是有限数时返回错误，由调用方决定回退策略。
pub fn resolve(
    global: &[ThresholdSetting],
    overrides_by_rack: &HashMap<String, Vec<ThresholdSetting>>,
    rack_id: &str,
) -> Result<EffectiveThresholds, AppError> {
    let mut values: BTreeMap<String, f64> = global
        .iter()
        .map(|s| (s.key.clone(), s.value))
        .collect();

    let Some(overrides) = overrides_by_rack.get(rack_id) else {
        return Ok(EffectiveThresholds::new(values));
    };

    for setting in overrides {
        if !setting.value.is_finite() {
            return Err(AppError::InvalidThreshold(format!(
                "机柜 {} 的覆盖值无效: {} = {}",
                rack_id, setting.key, setting.value
            )));
        }
        values.insert(setting.key.clone(), setting.value);
    }

    Ok(EffectiveThresholds::new(values))
}

/// 仅全局配置（覆盖解析失败时的回退）
pub fn global_only(global: &[ThresholdSetting]) -> EffectiveThresholds {
    EffectiveThresholds::from_settings(global)
}
