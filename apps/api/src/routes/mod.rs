pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::lifecycle::handlers;
use crate::state::AppState;

/// Headroom above the file limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes + MULTIPART_OVERHEAD_BYTES
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = upload_body_limit(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", get(handlers::handle_get_session))
        .route(
            "/api/v1/sessions/:id/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/v1/sessions/:id/reset", post(handlers::handle_reset))
        .route(
            "/api/v1/sessions/:id/chat",
            get(handlers::handle_get_chat).post(handlers::handle_send_chat),
        )
        .with_state(state)
}
