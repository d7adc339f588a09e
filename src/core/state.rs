//! 共享应用状态

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::app::products::service::ProductService;
use crate::infrastructure::database::{ProductStore, StoreSlot};
use crate::infrastructure::metrics::Metrics;

/// 就绪标记：首次连上数据库后置为 true，之后不再回退
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub readiness: Readiness,
    pub metrics: Metrics,
    pub products: ProductService,
    store: StoreSlot,
}

impl AppState {
    /// 未就绪、尚无数据库连接的初始状态
    pub fn new(metrics: Metrics) -> Self {
        let readiness = Readiness::new();
        let store = StoreSlot::default();
        let products = ProductService::new(store.clone(), readiness.clone(), metrics.clone());

        Self {
            readiness,
            metrics,
            products,
            store,
        }
    }

    /// 直接装入存储并标记就绪，跳过连接流程
    pub fn with_store(metrics: Metrics, store: Arc<dyn ProductStore>) -> Self {
        let state = Self::new(metrics);
        state.store.install(store);
        state.readiness.mark_ready();
        state
    }

    pub fn store_slot(&self) -> &StoreSlot {
        &self.store
    }
}
