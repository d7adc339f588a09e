use std::sync::Arc;

use product_service::infrastructure::database::{DatabaseManager, PgConnector};
use product_service::infrastructure::logger::Logger;
use product_service::{build_router, AppConfig, AppState, Metrics};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    Logger::init(&config.log_level);

    let metrics = Metrics::new()?;
    let state = AppState::new(metrics);

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!("App listening on port {}", config.port);

    // 后台连接数据库，HTTP 服务不等待
    let connector = Arc::new(PgConnector::new(config.database.clone()));
    DatabaseManager::new(connector, &state, config.database.retry_delay).spawn();

    let app = build_router(state, &config.static_dir);
    axum::serve(listener, app).await?;

    Ok(())
}
