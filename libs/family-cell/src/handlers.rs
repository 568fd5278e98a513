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

use crate::models::{CreateFamilyRequest, JoinFamilyRequest, MembershipResponse, UpdateMemberRequest};
use crate::services::{FamilyService, InviteCodeService};

#[axum::debug_handler]
pub async fn list_family_members(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Listing family members for user {}", user.id);

    let members = FamilyService::new(&config)
        .list_members(&user, auth.token())
        .await?;

    Ok(Json(json!(members)))
}

#[axum::debug_handler]
pub async fn get_current_family(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let overview = FamilyService::new(&config)
        .overview(&user, auth.token())
        .await?;

    Ok(Json(json!(overview)))
}

#[axum::debug_handler]
pub async fn create_family(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateFamilyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Create family request from user {}", user.id);

    let created = FamilyService::new(&config)
        .create_family(&user, request, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!(MembershipResponse::from(created))),
    ))
}

#[axum::debug_handler]
pub async fn join_family(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<JoinFamilyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Join family request from user {}", user.id);

    let joined = InviteCodeService::new(&config)
        .join_family(&user, request, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(json!(joined))))
}

#[axum::debug_handler]
pub async fn update_family_member(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<Json<Value>, AppError> {
    let member = FamilyService::new(&config)
        .update_member(&user, member_id, request, auth.token())
        .await?;

    Ok(Json(json!(member)))
}

#[axum::debug_handler]
pub async fn remove_family_member(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    FamilyService::new(&config)
        .remove_member(&user, member_id, auth.token())
        .await?;

    Ok(Json(json!({ "success": true })))
}
