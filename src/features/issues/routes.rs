use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::issues::handlers;
use crate::features::issues::services::IssueService;

/// Create routes for the issues feature
pub fn routes(service: Arc<IssueService>) -> Router {
    let upload = service.photos().config();
    // Whole batch plus 1MB for multipart overhead
    let upload_limit = upload.max_photos_per_issue * upload.max_photo_size + 1024 * 1024;

    Router::new()
        .route("/api/issues", post(handlers::create_issue))
        .route(
            "/api/issues/photos",
            post(handlers::upload_photos)
                .layer(DefaultBodyLimit::max(upload_limit))
                .delete(handlers::delete_photo),
        )
        .route(
            "/api/issues/{id}",
            get(handlers::get_issue)
                .patch(handlers::update_issue)
                .delete(handlers::delete_issue),
        )
        .route("/api/issues/{id}/spam-reports", post(handlers::report_spam))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_citizen_user, create_user, issue_service, with_auth, MemoryStorage,
        STORAGE_BASE_URL,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::json;

    fn server(storage: Arc<MemoryStorage>, authenticated: bool) -> TestServer {
        let router = routes(issue_service(storage));
        let router = if authenticated {
            with_auth(router, create_citizen_user())
        } else {
            router
        };
        TestServer::new(router).unwrap()
    }

    fn photo(name: &str, mime: &str, size: usize) -> Part {
        Part::bytes(vec![0xAB; size])
            .file_name(name.to_string())
            .mime_type(mime.to_string())
    }

    #[tokio::test]
    async fn test_create_issue_requires_authentication() {
        let response = server(Arc::default(), false)
            .post("/api/issues")
            .json(&json!({"title": "Pothole"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_create_issue_validates_before_io() {
        let response = server(Arc::default(), true)
            .post("/api/issues")
            .json(&json!({
                "title": "Pothole near station",
                "description": "Too short",
                "category": "roads",
                "postal_code": "ABC123",
                "area": "Anand",
                "location_address": "Station Road"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["notice"]["severity"], "error");
    }

    #[tokio::test]
    async fn test_upload_photos_returns_urls_in_order() {
        let storage = Arc::new(MemoryStorage::default());
        let form = MultipartForm::new()
            .add_part("photos", photo("front.jpg", "image/jpeg", 1024))
            .add_part("photos", photo("side.png", "image/png", 2048));

        let response = server(storage.clone(), true)
            .post("/api/issues/photos")
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        let urls = body["data"]["urls"].as_array().unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].as_str().unwrap().ends_with(".jpg"));
        assert!(urls[1].as_str().unwrap().ends_with(".png"));
        assert_eq!(body["message"], "2 photos uploaded");
        assert_eq!(storage.objects.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_rejects_whole_batch_on_bad_type() {
        let storage = Arc::new(MemoryStorage::default());
        let form = MultipartForm::new()
            .add_part("photos", photo("ok.jpg", "image/jpeg", 1024))
            .add_part("photos", photo("anim.gif", "image/gif", 1024));

        let response = server(storage.clone(), true)
            .post("/api/issues/photos")
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Photo 2: Invalid file type"));
        assert!(storage.objects.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_photos_is_rejected() {
        let form = MultipartForm::new().add_text("caption", "nothing attached");
        let response = server(Arc::default(), true)
            .post("/api/issues/photos")
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cannot_delete_another_users_photo() {
        let storage = Arc::new(MemoryStorage::default());
        let key = "public/issues/someone-else/photo.jpg";
        storage
            .objects
            .lock()
            .await
            .insert(key.to_string(), vec![1, 2, 3]);

        let response = server(storage.clone(), true)
            .delete("/api/issues/photos")
            .json(&json!({"url": format!("{}{}", STORAGE_BASE_URL, key)}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert!(storage.objects.lock().await.contains_key(key));
    }

    #[tokio::test]
    async fn test_owner_can_delete_uploaded_photo() {
        let storage = Arc::new(MemoryStorage::default());
        let owner = create_user("owner-1", &["user"]);
        let key = "public/issues/owner-1/photo.jpg";
        storage
            .objects
            .lock()
            .await
            .insert(key.to_string(), vec![1, 2, 3]);

        let router = with_auth(routes(issue_service(storage.clone())), owner);
        let response = TestServer::new(router)
            .unwrap()
            .delete("/api/issues/photos")
            .json(&json!({"url": format!("{}{}", STORAGE_BASE_URL, key)}))
            .await;
        response.assert_status_ok();
        assert!(storage.objects.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_spam_report_reason_is_validated_before_io() {
        let response = server(Arc::default(), true)
            .post(&format!("/api/issues/{}/spam-reports", uuid::Uuid::new_v4()))
            .json(&json!({"reason": "x".repeat(501)}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_issue_id_is_rejected() {
        let response = server(Arc::default(), false)
            .get("/api/issues/not-a-uuid")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
