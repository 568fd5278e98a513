use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::HeaderMap,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt;

use crate::models::UpdateProfileRequest;
use crate::services::ProfileService;

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let user = jwt::validate_token(token, &config.supabase_jwt_secret)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Like [`validate_token`] but answers `{"valid": false}` instead of failing.
pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;
    let valid = jwt::validate_token(token, &config.supabase_jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&config)
        .get_profile(&user, auth.token())
        .await?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&config)
        .update_profile(&user, request, auth.token())
        .await?;

    Ok(Json(json!(profile)))
}
