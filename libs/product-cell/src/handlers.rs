use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateProductRequest, UpdateProductRequest};
use crate::services::ProductService;

#[axum::debug_handler]
pub async fn list_products(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Listing products for user {}", user.id);

    let products = ProductService::new(&config)
        .list_products(&user, auth.token())
        .await?;

    Ok(Json(json!(products)))
}

#[axum::debug_handler]
pub async fn create_product(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let product = ProductService::new(&config)
        .create_product(&user, request, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(json!(product))))
}

#[axum::debug_handler]
pub async fn update_product(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Value>, AppError> {
    let product = ProductService::new(&config)
        .update_product(&user, product_id, request, auth.token())
        .await?;

    Ok(Json(json!(product)))
}

#[axum::debug_handler]
pub async fn delete_product(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    ProductService::new(&config)
        .delete_product(&user, product_id, auth.token())
        .await?;

    Ok(Json(json!({ "success": true })))
}
