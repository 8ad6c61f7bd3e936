//! Rackwatch - 机柜 PDU 监控与告警核心
//!
//! 按周期对机柜 PDU 读数分级并维护活跃告警表，支持：
//! - 全局阈值与机柜覆盖阈值合并
//! - 机柜 / 整链维护排除
//! - 电流、电压、温度、湿度四项指标分级
//! - 严重告警的创建、刷新与自动清理

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;

pub use errors::AppError;
