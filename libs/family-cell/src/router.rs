use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn family_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_family_members).post(create_family))
        .route("/current", get(get_current_family))
        .route("/join", post(join_family))
        .route(
            "/members/{member_id}",
            put(update_family_member).delete(remove_family_member),
        )
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
