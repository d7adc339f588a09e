//! 核心中间件模块

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求日志中间件，为每个请求生成 request id 并回写到响应头
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = Uuid::new_v4().to_string();

    let mut response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        "{} {} - {} - {}ms - request_id={}",
        method,
        uri,
        status,
        duration.as_millis(),
        request_id
    );

    response
}

/// 请求指标中间件
///
/// 路由标签优先取匹配到的路由模板，未匹配（如 404）时退回原始路径。
pub async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };

    let response = next.run(req).await;

    state
        .metrics
        .observe_request(&method, &route, response.status().as_u16(), start.elapsed());

    response
}
