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

use crate::models::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest};
use crate::services::TaskService;

#[axum::debug_handler]
pub async fn list_tasks(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Value>, AppError> {
    debug!("Listing tasks for user {}", user.id);

    let tasks = TaskService::new(&config)
        .list_tasks(&user, query, auth.token())
        .await?;

    Ok(Json(json!(tasks)))
}

#[axum::debug_handler]
pub async fn create_task(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let task = TaskService::new(&config)
        .create_task(&user, request, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(json!(task))))
}

#[axum::debug_handler]
pub async fn update_task(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<Value>, AppError> {
    let task = TaskService::new(&config)
        .update_task(&user, task_id, request, auth.token())
        .await?;

    Ok(Json(json!(task)))
}

#[axum::debug_handler]
pub async fn delete_task(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    TaskService::new(&config)
        .delete_task(&user, task_id, auth.token())
        .await?;

    Ok(Json(json!({ "success": true })))
}
