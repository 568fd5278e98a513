use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn medication_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_medications).post(create_medication))
        .route(
            "/{medication_id}",
            put(update_medication).delete(delete_medication),
        )
        .route("/{medication_id}/adherence", get(get_medication_adherence))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}

pub fn medication_log_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_medication_logs))
        .route("/{log_id}", patch(update_medication_log))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
