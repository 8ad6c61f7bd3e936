//! 测试辅助工具

#![allow(dead_code)]

use rackwatch::models::{MetricReading, ThresholdSetting};
use uuid::Uuid;

/// 生成固定的测试 UUID（用于可重复测试）
pub fn fixed_uuid(seed: u8) -> Uuid {
    Uuid::from_bytes([seed, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, seed])
}

/// 只带标识的读数
pub fn reading(pdu_id: &str, rack_id: &str) -> MetricReading {
    MetricReading::new(pdu_id, rack_id)
}

pub fn voltage_reading(pdu_id: &str, rack_id: &str, voltage: f64) -> MetricReading {
    let mut reading = reading(pdu_id, rack_id);
    reading.voltage = Some(voltage);
    reading
}

pub fn current_reading(pdu_id: &str, rack_id: &str, current: f64, phase: &str) -> MetricReading {
    let mut reading = reading(pdu_id, rack_id);
    reading.current = Some(current);
    reading.phase = Some(phase.to_string());
    reading
}

pub fn settings(pairs: &[(&str, f64)]) -> Vec<ThresholdSetting> {
    pairs
        .iter()
        .map(|(key, value)| ThresholdSetting::new(*key, *value))
        .collect()
}

/// 电压阈值：严重 200/250，预警 210/240
pub fn voltage_thresholds() -> Vec<ThresholdSetting> {
    settings(&[
        ("critical_voltage_low", 200.0),
        ("critical_voltage_high", 250.0),
        ("warning_voltage_low", 210.0),
        ("warning_voltage_high", 240.0),
    ])
}

/// 单相电流阈值：严重 1/30，预警 2/25
pub fn amperage_thresholds() -> Vec<ThresholdSetting> {
    settings(&[
        ("critical_amperage_low_single_phase", 1.0),
        ("critical_amperage_high_single_phase", 30.0),
        ("warning_amperage_low_single_phase", 2.0),
        ("warning_amperage_high_single_phase", 25.0),
        ("critical_amperage_low_3_phase", 1.0),
        ("critical_amperage_high_3_phase", 60.0),
        ("warning_amperage_low_3_phase", 2.0),
        ("warning_amperage_high_3_phase", 50.0),
    ])
}

/// 环境阈值：温度 5/40、10/35，湿度 10/80、20/70
pub fn environment_thresholds() -> Vec<ThresholdSetting> {
    settings(&[
        ("critical_temperature_low", 5.0),
        ("critical_temperature_high", 40.0),
        ("warning_temperature_low", 10.0),
        ("warning_temperature_high", 35.0),
        ("critical_humidity_low", 10.0),
        ("critical_humidity_high", 80.0),
        ("warning_humidity_low", 20.0),
        ("warning_humidity_high", 70.0),
    ])
}

/// 全部指标的阈值
pub fn full_thresholds() -> Vec<ThresholdSetting> {
    let mut all = amperage_thresholds();
    all.extend(voltage_thresholds());
    all.extend(environment_thresholds());
    all
}

/// 断言结果是成功的
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// 断言结果是错误的
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(e) => e,
        }
    };
}
