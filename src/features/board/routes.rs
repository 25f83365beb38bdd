use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::board::handlers;
use crate::features::board::services::BoardService;

pub fn routes(service: Arc<BoardService>) -> Router {
    Router::new()
        .route("/api/board/sessions", post(handlers::create_session))
        .route(
            "/api/board/sessions/{id}",
            get(handlers::get_session).delete(handlers::close_session),
        )
        .route(
            "/api/board/sessions/{id}/postal-code",
            put(handlers::select_postal_code),
        )
        .route("/api/board/sessions/{id}/filters", put(handlers::update_filters))
        .route("/api/board/sessions/{id}/page", put(handlers::change_page))
        .route("/api/board/sessions/{id}/view", put(handlers::set_view_mode))
        .route(
            "/api/board/sessions/{id}/map",
            get(handlers::get_map).put(handlers::update_map_settings),
        )
        .with_state(service)
}
