//! 产品业务服务

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::model::{NewProduct, Product};
use crate::core::error::ApiError;
use crate::core::state::Readiness;
use crate::infrastructure::database::{ProductStore, StoreSlot};
use crate::infrastructure::metrics::{query, Metrics};

/// 列表接口返回的最大条数
pub const LIST_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct ProductService {
    store: StoreSlot,
    readiness: Readiness,
    metrics: Metrics,
}

impl ProductService {
    pub fn new(store: StoreSlot, readiness: Readiness, metrics: Metrics) -> Self {
        Self {
            store,
            readiness,
            metrics,
        }
    }

    fn ready_store(&self) -> Result<Arc<dyn ProductStore>, ApiError> {
        if !self.readiness.is_ready() {
            return Err(ApiError::NotReady);
        }
        self.store.get().ok_or(ApiError::NotReady)
    }

    pub async fn list_recent(&self) -> Result<Vec<Product>, ApiError> {
        let store = self.ready_store()?;

        let start = Instant::now();
        let products = store.list_recent(LIST_LIMIT).await?;
        self.metrics.observe_query(query::SELECT_PRODUCTS, start.elapsed());

        Ok(products)
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let store = self.ready_store()?;

        let start = Instant::now();
        let created = store.insert(product).await?;
        self.metrics.observe_query(query::INSERT_PRODUCT, start.elapsed());

        info!("Created product: {} ({})", created.name, created.id);
        Ok(created)
    }
}
