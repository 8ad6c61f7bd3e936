//! 数据访问层（Repository）

mod alert_repo;
mod maintenance_repo;
mod reading_repo;
mod threshold_repo;

pub use alert_repo::{AlertRepository, AlertStore};
pub use maintenance_repo::{MaintenanceRepository, MaintenanceStore};
pub use reading_repo::{ReadingRepository, ReadingSource};
pub use threshold_repo::{ThresholdRepository, ThresholdStore};
