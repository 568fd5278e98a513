use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn product_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{product_id}", put(update_product).delete(delete_product))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
