//! 数据库基础设施
//!
//! 进程内只保留一条 PostgreSQL 连接。[`DatabaseManager`] 在后台以固定间隔重试连接，
//! 连上后置就绪标记，再单独重试建表语句。

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::products::model::{NewProduct, Product};
use crate::core::state::{AppState, Readiness};
use crate::infrastructure::config::DatabaseConfig;
use crate::infrastructure::metrics::{query, Metrics};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        price NUMERIC NOT NULL,
        created_at TIMESTAMP DEFAULT NOW()
    )
"#;

const SELECT_RECENT_SQL: &str =
    "SELECT id, name, price, created_at FROM products ORDER BY created_at DESC LIMIT $1";

const INSERT_SQL: &str =
    "INSERT INTO products (name, price) VALUES ($1, $2) RETURNING id, name, price, created_at";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("schema setup failed: {0}")]
    Migrate(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// 产品表的存取接口
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 幂等建表
    async fn ensure_schema(&self) -> Result<(), DbError>;

    /// 按创建时间倒序取最近 `limit` 条
    async fn list_recent(&self, limit: i64) -> Result<Vec<Product>, DbError>;

    async fn insert(&self, product: &NewProduct) -> Result<Product, DbError>;
}

/// 建立一条到存储的连接
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ProductStore>, DbError>;
}

/// 连接建立后写入一次、供所有处理器共享的存储句柄
#[derive(Clone, Default)]
pub struct StoreSlot(Arc<OnceLock<Arc<dyn ProductStore>>>);

impl StoreSlot {
    /// 已装入过时返回 false，原有句柄保持不变
    pub fn install(&self, store: Arc<dyn ProductStore>) -> bool {
        self.0.set(store).is_ok()
    }

    pub fn get(&self) -> Option<Arc<dyn ProductStore>> {
        self.0.get().cloned()
    }
}

/// 基于单条 `PgConnection` 的实现，查询经互斥锁串行执行
pub struct PgProductStore {
    conn: Mutex<PgConnection>,
}

impl PgProductStore {
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        let mut conn = self.conn.lock().await;
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&mut *conn)
            .await
            .map_err(DbError::Migrate)?;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Product>, DbError> {
        let mut conn = self.conn.lock().await;
        sqlx::query_as::<_, Product>(SELECT_RECENT_SQL)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await
            .map_err(DbError::Query)
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, DbError> {
        let mut conn = self.conn.lock().await;
        sqlx::query_as::<_, Product>(INSERT_SQL)
            .bind(&product.name)
            .bind(product.price)
            .fetch_one(&mut *conn)
            .await
            .map_err(DbError::Query)
    }
}

pub struct PgConnector {
    config: DatabaseConfig,
}

impl PgConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for PgConnector {
    async fn connect(&self) -> Result<Arc<dyn ProductStore>, DbError> {
        info!(
            "Connecting to database: postgres://{}:***@{}:{}/{}",
            self.config.user, self.config.host, self.config.port, self.config.name
        );
        let conn = PgConnection::connect_with(&self.config.pg_options())
            .await
            .map_err(DbError::Connect)?;
        Ok(Arc::new(PgProductStore::new(conn)))
    }
}

/// 后台连接任务
pub struct DatabaseManager {
    connector: Arc<dyn StoreConnector>,
    slot: StoreSlot,
    readiness: Readiness,
    metrics: Metrics,
    retry_delay: Duration,
}

impl DatabaseManager {
    pub fn new(connector: Arc<dyn StoreConnector>, state: &AppState, retry_delay: Duration) -> Self {
        Self {
            connector,
            slot: state.store_slot().clone(),
            readiness: state.readiness.clone(),
            metrics: state.metrics.clone(),
            retry_delay,
        }
    }

    pub fn spawn(self) -> JoinHandle<Arc<dyn ProductStore>> {
        tokio::spawn(self.run())
    }

    /// 连接成功并完成建表后返回存储句柄；两个阶段都会无限重试
    pub async fn run(self) -> Arc<dyn ProductStore> {
        let store = self.connect_until_ready().await;
        self.migrate_until_done(store.as_ref()).await;
        store
    }

    async fn connect_until_ready(&self) -> Arc<dyn ProductStore> {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match self.connector.connect().await {
                Ok(store) => {
                    if !self.slot.install(store.clone()) {
                        warn!("Store already installed, keeping the existing connection");
                    }
                    self.readiness.mark_ready();
                    info!("Connected to PostgreSQL");
                    return self.slot.get().unwrap_or(store);
                }
                Err(e) => {
                    error!("DB Connection error: {}", e);
                    warn!(
                        "Retrying connection in {}ms (attempt {})",
                        self.retry_delay.as_millis(),
                        attempt
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    async fn migrate_until_done(&self, store: &dyn ProductStore) {
        loop {
            let start = Instant::now();
            match store.ensure_schema().await {
                Ok(()) => {
                    self.metrics.observe_query(query::CREATE_TABLE, start.elapsed());
                    info!("Migration completed");
                    return;
                }
                Err(e) => {
                    error!("DB Migration error: {}", e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}
