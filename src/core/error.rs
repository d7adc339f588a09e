//! 核心错误处理模块

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::infrastructure::database::DbError;

/// 对外暴露的错误类型，只携带 HTTP 状态和固定的错误文案
#[derive(Debug)]
pub enum ApiError {
    /// 数据库尚未连接
    NotReady,
    /// 请求体缺少 name 或 price
    Validation(validator::ValidationErrors),
    /// 查询失败
    Database(DbError),
    /// 请求体无法读取，沿用框架给出的状态码
    Rejected(JsonRejection),
    /// 其他内部错误
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Rejected(rejection) => return rejection.into_response(),
            ApiError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "DB not connected"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "Name and price required"),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Database(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<prometheus::Error> for ApiError {
    fn from(err: prometheus::Error) -> Self {
        ApiError::Internal(format!("metrics: {}", err))
    }
}
