use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (nested under `/api/admin`; moderators or admins only)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/issues", get(handlers::list_issues))
        .route("/issues/moderation", get(handlers::list_moderation_queue))
        .route("/issues/approve", post(handlers::approve_issues))
        .route("/issues/bulk-delete", post(handlers::bulk_delete_issues))
        .route(
            "/issues/{id}",
            get(handlers::get_issue).delete(handlers::delete_issue),
        )
        .route("/issues/{id}/status", patch(handlers::update_issue_status))
        .route("/users", get(handlers::list_users))
        .route("/users/ban", post(handlers::ban_users))
        .route("/spam-reports", get(handlers::list_spam_reports))
        .route("/spam-reports/{id}", delete(handlers::dismiss_spam_report))
        .route("/stats", get(handlers::get_stats))
        .route("/analytics", get(handlers::get_analytics))
        .with_state(admin_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::profiles::ProfileService;
    use crate::shared::test_helpers::{
        create_admin_user, create_citizen_user, create_moderator_user, issue_service, lazy_pool,
        with_auth,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn admin_router() -> Router {
        let pool = lazy_pool();
        let service = AdminService::new(
            pool.clone(),
            issue_service(Arc::default()),
            Arc::new(ProfileService::new(pool)),
        );
        Router::new().nest("/api/admin", routes(Arc::new(service)))
    }

    fn server(user: Option<AuthenticatedUser>) -> TestServer {
        let router = match user {
            Some(user) => with_auth(admin_router(), user),
            None => admin_router(),
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_admin_routes_require_authentication() {
        server(None)
            .get("/api/admin/stats")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_citizens_are_forbidden() {
        let server = server(Some(create_citizen_user()));

        let response = server.get("/api/admin/issues").await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["message"], "Admin or moderator access required");

        server
            .post("/api/admin/issues/approve")
            .json(&json!({"ids": []}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_only_admins_can_ban() {
        let response = server(Some(create_moderator_user()))
            .post("/api/admin/users/ban")
            .json(&json!({"ids": ["test-citizen"], "banned": true}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["message"], "Admin access required");
    }

    #[tokio::test]
    async fn test_empty_selection_returns_warning() {
        let server = server(Some(create_moderator_user()));

        for path in ["/api/admin/issues/approve", "/api/admin/issues/bulk-delete"] {
            let response = server.post(path).json(&json!({"ids": []})).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["success"], false);
            assert_eq!(body["notice"]["severity"], "warning");
            assert_eq!(body["notice"]["dismiss_after_ms"], 5000);
        }

        let body: Value = server
            .post("/api/admin/issues/approve")
            .json(&json!({}))
            .await
            .json();
        assert_eq!(body["message"], "Please select issues to approve");
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        server(Some(create_moderator_user()))
            .patch("/api/admin/issues/0190f5f4-3c1a-7d2e-8f00-000000000001/status")
            .json(&json!({"status": "closed"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ban_validation_runs_before_io() {
        let server = server(Some(create_admin_user()));

        let response = server
            .post("/api/admin/users/ban")
            .json(&json!({"ids": [], "banned": true}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["notice"]["severity"], "error");

        let response = server
            .post("/api/admin/users/ban")
            .json(&json!({"ids": ["test-admin"], "banned": true}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "You cannot ban yourself");
    }

    #[tokio::test]
    async fn test_malformed_ids_are_rejected() {
        server(Some(create_moderator_user()))
            .delete("/api/admin/spam-reports/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
