//! 健康检查、就绪检查与指标导出

pub mod handler;
