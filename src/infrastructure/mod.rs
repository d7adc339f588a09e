//! 基础设施层：配置、日志、指标与数据库

pub mod config;
pub mod database;
pub mod logger;
pub mod metrics;
