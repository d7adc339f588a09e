//! 测试用的内存存储与连接器

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use product_service::app::products::model::{NewProduct, Product};
use product_service::infrastructure::database::{DbError, ProductStore, StoreConnector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

fn protocol_error(msg: &str) -> sqlx::Error {
    sqlx::Error::Protocol(msg.to_string())
}

/// 内存存储，按插入顺序递增 id 和创建时间
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Product>>,
    pub schema_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Product>, DbError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, DbError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i32 + 1;
        let row = Product {
            id,
            name: product.name.clone(),
            price: product.price,
            created_at: Some(base_time() + Duration::seconds(i64::from(id))),
        };
        rows.push(row.clone());
        Ok(row)
    }
}

/// 所有查询都失败
#[derive(Default)]
pub struct FailingStore;

#[async_trait]
impl ProductStore for FailingStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn list_recent(&self, _limit: i64) -> Result<Vec<Product>, DbError> {
        Err(DbError::Query(protocol_error("simulated select failure")))
    }

    async fn insert(&self, _product: &NewProduct) -> Result<Product, DbError> {
        Err(DbError::Query(protocol_error("simulated insert failure")))
    }
}

/// 建表语句先失败若干次
pub struct FlakySchemaStore {
    inner: MemoryStore,
    failures_left: AtomicUsize,
    pub schema_calls: AtomicUsize,
}

impl FlakySchemaStore {
    pub fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::default(),
            failures_left: AtomicUsize::new(failures),
            schema_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProductStore for FlakySchemaStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(DbError::Migrate(protocol_error("simulated migration failure")));
        }
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Product>, DbError> {
        self.inner.list_recent(limit).await
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, DbError> {
        self.inner.insert(product).await
    }
}

/// 建表语句阻塞，直到测试放行
#[derive(Default)]
pub struct GatedSchemaStore {
    inner: MemoryStore,
    pub gate: Notify,
}

#[async_trait]
impl ProductStore for GatedSchemaStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        self.gate.notified().await;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Product>, DbError> {
        self.inner.list_recent(limit).await
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, DbError> {
        self.inner.insert(product).await
    }
}

/// 先失败 `failures` 次再返回给定存储；`usize::MAX` 表示永远失败
pub struct ScriptedConnector {
    store: Arc<dyn ProductStore>,
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(store: Arc<dyn ProductStore>, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            store,
            failures_left: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for ScriptedConnector {
    async fn connect(&self) -> Result<Arc<dyn ProductStore>, DbError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(DbError::Connect(protocol_error("connection refused")));
        }
        Ok(self.store.clone())
    }
}
