pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::state::AppState;
use crate::upload::handlers;

/// Largest accepted request body (16 MB).
pub const MAX_CONTENT_LENGTH: usize = 16 * 1000 * 1000;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/",
            get(handlers::handle_upload_form).post(handlers::handle_upload),
        )
        .route(
            "/resume",
            get(handlers::handle_upload_form).post(handlers::handle_upload),
        )
        .route("/resume/:name", get(handlers::handle_display_resume))
        .layer(DefaultBodyLimit::max(MAX_CONTENT_LENGTH))
        .with_state(state)
}
