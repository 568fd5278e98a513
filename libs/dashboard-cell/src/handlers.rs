use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::services::DashboardService;

#[axum::debug_handler]
pub async fn get_dashboard(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Building dashboard for user {}", user.id);

    let dashboard = DashboardService::new(&config)
        .build_dashboard(&user, auth.token())
        .await?;

    Ok(Json(json!(dashboard)))
}
