use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn task_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/{task_id}", put(update_task).delete(delete_task))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
