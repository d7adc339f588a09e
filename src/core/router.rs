//! 路由装配

use axum::{middleware, routing::get, Router};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::middleware::{request_logging_middleware, track_metrics};
use super::state::AppState;
use crate::app::{probes, products};

/// 显式路由优先，其余路径交给静态资源目录，找不到时返回 404
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/healthz", get(probes::handler::healthz))
        .route("/readyz", get(probes::handler::readyz))
        .route("/metrics", get(probes::handler::metrics))
        .route(
            "/products",
            get(products::handler::list_products).post(products::handler::create_product),
        )
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(middleware::from_fn_with_state(state.clone(), track_metrics)),
        )
        .with_state(state)
}
