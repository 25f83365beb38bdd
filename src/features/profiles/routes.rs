use crate::features::profiles::handlers;
use crate::features::profiles::services::ProfileService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route("/api/profiles", post(handlers::create_profile))
        .route("/api/profiles/me", get(handlers::get_my_profile))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_citizen_user, lazy_pool, with_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn server(authenticated: bool) -> TestServer {
        let router = routes(Arc::new(ProfileService::new(lazy_pool())));
        let router = if authenticated {
            with_auth(router, create_citizen_user())
        } else {
            router
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_create_profile_requires_authentication() {
        let response = server(false)
            .post("/api/profiles")
            .json(&json!({"username": "ravi_patel"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_profile_rejects_invalid_username_before_io() {
        let response = server(true)
            .post("/api/profiles")
            .json(&json!({"username": "1 bad name"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["notice"]["severity"], "error");
    }
}
