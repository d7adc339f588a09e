//! 指标基础设施
//!
//! 每个 [`Metrics`] 持有独立的 Prometheus 注册表，由启动流程显式构造后注入路由层。

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// 请求耗时与查询耗时共用的分桶边界（秒）
pub const DURATION_BUCKETS: [f64; 6] = [0.1, 0.5, 1.0, 1.5, 2.0, 5.0];

/// 数据库查询标签
pub mod query {
    pub const CREATE_TABLE: &str = "create_table";
    pub const SELECT_PRODUCTS: &str = "select_products";
    pub const INSERT_PRODUCT: &str = "insert_product";
}

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration: HistogramVec,
    db_query_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status_code"],
        )?;
        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route", "status_code"],
        )?;
        let db_query_duration = HistogramVec::new(
            HistogramOpts::new("db_query_duration_seconds", "Duration of DB queries in seconds")
                .buckets(DURATION_BUCKETS.to_vec()),
            &["query"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(db_query_duration.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            db_query_duration,
        })
    }

    /// 记录一次已完成的 HTTP 请求
    pub fn observe_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        let labels = [method, route, status.as_str()];
        self.http_requests_total.with_label_values(&labels).inc();
        self.http_request_duration
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }

    pub fn observe_query(&self, query: &str, elapsed: Duration) {
        self.db_query_duration
            .with_label_values(&[query])
            .observe(elapsed.as_secs_f64());
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// 序列化当前注册表快照（文本格式）
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
