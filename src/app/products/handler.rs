//! 产品处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};

use super::model::{CreateProductRequest, Product};
use crate::core::error::ApiError;
use crate::core::state::AppState;

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list_recent().await?;
    Ok(Json(products))
}

// 校验先于就绪检查：无效请求体无论数据库状态都返回 400
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let request = match payload {
        Ok(Json(body)) => body,
        // 内容类型或 JSON 本身有误时按空对象处理，读取请求体失败（如超限）保留原状态码
        Err(
            JsonRejection::JsonDataError(_)
            | JsonRejection::JsonSyntaxError(_)
            | JsonRejection::MissingJsonContentType(_),
        ) => CreateProductRequest::default(),
        Err(rejection) => return Err(ApiError::Rejected(rejection)),
    };
    let new_product = request.into_new_product()?;

    let product = state.products.create(&new_product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}
