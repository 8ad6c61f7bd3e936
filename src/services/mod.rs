//! 业务逻辑层（Service）

pub mod classifier;
pub mod maintenance_gate;
pub mod rack_evaluator;
pub mod threshold_resolver;

mod alert_lifecycle;
mod monitor_service;

pub use alert_lifecycle::{plan, AlertLifecycleManager, ReconcilePlan};
pub use monitor_service::MonitorService;
pub use rack_evaluator::{evaluate, Evaluation};
