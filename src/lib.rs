//! # 产品服务
//!
//! 基于 Axum 的单资源 HTTP 服务：
//! - `/products` 列表与创建，数据存于 PostgreSQL
//! - `/healthz`、`/readyz` 探针
//! - `/metrics` Prometheus 文本格式指标

pub mod app;
pub mod core;
pub mod infrastructure;

pub use crate::core::router::build_router;
pub use crate::core::state::{AppState, Readiness};
pub use crate::infrastructure::config::AppConfig;
pub use crate::infrastructure::metrics::Metrics;
