use std::sync::Arc;

use axum::{routing::get, Router};

use auth_cell::auth_routes;
use dashboard_cell::dashboard_routes;
use family_cell::family_routes;
use medication_cell::{medication_log_routes, medication_routes};
use product_cell::product_routes;
use shared_config::AppConfig;
use task_cell::task_routes;
use vitals_cell::vitals_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareNavi API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/family", family_routes(state.clone()))
        .nest("/medications", medication_routes(state.clone()))
        .nest("/medication-logs", medication_log_routes(state.clone()))
        .nest("/vitals", vitals_routes(state.clone()))
        .nest("/tasks", task_routes(state.clone()))
        .nest("/products", product_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use shared_config::AppConfig;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "anon".to_string(),
            supabase_jwt_secret: "secret".to_string(),
            server_port: 3000,
            display_utc_offset_minutes: 0,
        })
    }

    #[tokio::test]
    async fn test_root_is_public() {
        let response = create_router(test_state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_every_resource_requires_a_token() {
        for uri in [
            "/family",
            "/medications",
            "/medication-logs",
            "/vitals",
            "/tasks",
            "/products",
            "/dashboard",
        ] {
            let response = create_router(test_state())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }
}
