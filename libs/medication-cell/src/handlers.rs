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

use crate::models::{
    AdherenceQuery, CreateMedicationRequest, LogListQuery, MedicationListQuery, UpdateLogRequest,
    UpdateMedicationRequest,
};
use crate::services::{LogService, MedicationService};

#[axum::debug_handler]
pub async fn list_medications(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<MedicationListQuery>,
) -> Result<Json<Value>, AppError> {
    debug!("Listing medications for user {}", user.id);

    let medications = MedicationService::new(&config)
        .list_medications(&user, query, auth.token())
        .await?;

    Ok(Json(json!(medications)))
}

#[axum::debug_handler]
pub async fn create_medication(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMedicationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let medication = MedicationService::new(&config)
        .create_medication(&user, request, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(json!(medication))))
}

#[axum::debug_handler]
pub async fn update_medication(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(medication_id): Path<Uuid>,
    Json(request): Json<UpdateMedicationRequest>,
) -> Result<Json<Value>, AppError> {
    let medication = MedicationService::new(&config)
        .update_medication(&user, medication_id, request, auth.token())
        .await?;

    Ok(Json(json!(medication)))
}

#[axum::debug_handler]
pub async fn delete_medication(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(medication_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    MedicationService::new(&config)
        .deactivate_medication(&user, medication_id, auth.token())
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_medication_adherence(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(medication_id): Path<Uuid>,
    Query(query): Query<AdherenceQuery>,
) -> Result<Json<Value>, AppError> {
    let days = query.window_days()?;

    let adherence = MedicationService::new(&config)
        .medication_adherence(&user, medication_id, days, auth.token())
        .await?;

    Ok(Json(json!(adherence)))
}

#[axum::debug_handler]
pub async fn list_medication_logs(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<LogListQuery>,
) -> Result<Json<Value>, AppError> {
    debug!("Listing medication logs for user {}", user.id);

    let logs = LogService::new(&config)
        .list_logs(&user, query.date.as_deref(), auth.token())
        .await?;

    Ok(Json(json!(logs)))
}

#[axum::debug_handler]
pub async fn update_medication_log(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(log_id): Path<Uuid>,
    Json(request): Json<UpdateLogRequest>,
) -> Result<Json<Value>, AppError> {
    let log = LogService::new(&config)
        .update_log(&user, log_id, request, auth.token())
        .await?;

    Ok(Json(json!(log)))
}
