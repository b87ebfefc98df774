//! HTTP endpoint handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::auth::RequestContext;
use crate::moderation::ModerationHandler;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ModerationHandler>,
}

impl AppState {
    pub fn new(handler: ModerationHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Moderation Callback
// =============================================================================

/// Moderation callback response.
#[derive(Serialize)]
pub struct ModerationResponse {
    pub status: &'static str,
}

/// Moderation callback endpoint.
///
/// Accepts any method; the method takes part in the signature. Query
/// parameters and form-encoded body parameters are both signed.
///
/// The handler may write the store file, so it runs on the blocking pool.
pub async fn moderate(
    State(state): State<AppState>,
    Path((content_id, action)): Path<(String, String)>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!(
        method = %method,
        content_id = %content_id,
        action = %action,
        has_authorization = headers.contains_key(header::AUTHORIZATION),
        "moderation_request_received"
    );

    let mut request = RequestContext::new(method.as_str(), uri.path());
    if let Some(query) = uri.query() {
        request = request.with_query(query);
    }
    if is_form_encoded(&headers) {
        request = request.with_form_body(&body);
    }
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        request = request.with_authorization(value);
    }

    let handler = state.handler.clone();
    let id = content_id.clone();
    let outcome = match tokio::task::spawn_blocking(move || handler.handle(&id, &action, &request))
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, content_id = %content_id, "moderation_handler_failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ModerationResponse { status: "error" }),
            )
                .into_response();
        }
    };

    info!(
        content_id = %content_id,
        outcome = outcome.label(),
        "moderation_request_complete"
    );

    let body = Json(ModerationResponse {
        status: outcome.label(),
    });
    match outcome.status() {
        Some(code) => (code, body).into_response(),
        None => body.into_response(),
    }
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
