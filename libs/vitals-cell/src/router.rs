use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn vitals_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_vitals).post(create_vital))
        .route("/chart", get(get_vitals_chart))
        .route("/{vital_id}", delete(delete_vital))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
