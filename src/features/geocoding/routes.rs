use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::geocoding::handlers;
use crate::features::geocoding::services::LocationResolver;

pub fn routes(resolver: Arc<LocationResolver>) -> Router {
    Router::new()
        .route(
            "/api/geocode/postal-codes/{code}",
            get(handlers::locate_postal_code),
        )
        .route("/api/geocode/search", get(handlers::search_address))
        .route("/api/geocode/reverse", get(handlers::reverse_geocode))
        .with_state(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::location_resolver;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    fn server() -> TestServer {
        TestServer::new(routes(location_resolver())).unwrap()
    }

    #[tokio::test]
    async fn test_known_postal_code_is_resolved() {
        let body: Value = server().get("/api/geocode/postal-codes/388001").await.json();
        assert_eq!(body["data"]["source"], "resolved");
        assert_eq!(body["data"]["center"]["lat"], 22.5645);
    }

    #[tokio::test]
    async fn test_geocoder_failure_falls_back_to_default_center() {
        let response = server().get("/api/geocode/postal-codes/999999").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["source"], "fallback");
        assert_eq!(body["data"]["center"]["lat"], 20.5937);
    }

    #[tokio::test]
    async fn test_malformed_postal_code_is_rejected() {
        server()
            .get("/api/geocode/postal-codes/38800")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server()
            .get("/api/geocode/search")
            .add_query_param("postal_code", "abc")
            .add_query_param("address", "Station Road")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_address_search_uses_postal_code_center() {
        let body: Value = server()
            .get("/api/geocode/search")
            .add_query_param("postal_code", "388001")
            .add_query_param("address", "Station Road")
            .await
            .json();
        assert_eq!(body["data"]["postal_code"], "388001");
        assert_eq!(body["data"]["source"], "resolved");
    }

    #[tokio::test]
    async fn test_reverse_lookup_labels_unknown_points() {
        let body: Value = server()
            .get("/api/geocode/reverse")
            .add_query_param("lat", 22.5645)
            .add_query_param("lon", 72.9289)
            .await
            .json();
        assert_eq!(body["data"]["address"], "Anand, Gujarat, India");

        let body: Value = server()
            .get("/api/geocode/reverse")
            .add_query_param("lat", 10.0)
            .add_query_param("lon", 20.0)
            .await
            .json();
        assert_eq!(body["data"]["address"], "Location at 10.000000, 20.000000");

        server()
            .get("/api/geocode/reverse")
            .add_query_param("lat", 95.0)
            .add_query_param("lon", 20.0)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
