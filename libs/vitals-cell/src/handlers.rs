use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
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

use crate::models::{ChartQuery, CreateVitalRequest, VitalListQuery};
use crate::services::VitalService;

#[axum::debug_handler]
pub async fn list_vitals(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<VitalListQuery>,
) -> Result<Json<Value>, AppError> {
    debug!("Listing vitals for user {}", user.id);

    let vitals = VitalService::new(&config)
        .list_vitals(&user, query, auth.token())
        .await?;

    Ok(Json(json!(vitals)))
}

#[axum::debug_handler]
pub async fn create_vital(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateVitalRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let vital = VitalService::new(&config)
        .create_vital(&user, request, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(json!(vital))))
}

#[axum::debug_handler]
pub async fn delete_vital(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(vital_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    VitalService::new(&config)
        .delete_vital(&user, vital_id, auth.token())
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_vitals_chart(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Value>, AppError> {
    let points = VitalService::new(&config)
        .chart(&user, query, auth.token())
        .await?;

    Ok(Json(json!(points)))
}
