//! 数据模型模块

mod alert;
mod maintenance;
mod reading;
mod summary;
mod threshold;

pub use alert::*;
pub use maintenance::*;
pub use reading::*;
pub use summary::*;
pub use threshold::*;
