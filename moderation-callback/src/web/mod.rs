//! Web server module for the inbound moderation callback.
//!
//! Routes:
//! - `GET /health`
//! - `ANY /moderation/:content_id/:action`

pub mod handlers;

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, moderate, AppState, HealthResponse, ModerationResponse};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/moderation/:content_id/:action", any(moderate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
