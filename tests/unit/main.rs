//! 服务层测试（内存存储）

#[path = "../mocks/mod.rs"]
mod mocks;

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

mod report_service_tests;
