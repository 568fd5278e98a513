use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::get_dashboard;

pub fn dashboard_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(get_dashboard))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
