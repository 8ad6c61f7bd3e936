//! 集成测试入口（内存存储）

#[path = "../helpers/mod.rs"]
mod helpers;
#[path = "../mocks/mod.rs"]
mod mocks;

mod monitor_tests;
