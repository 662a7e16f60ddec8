pub mod ask;
pub mod context;
pub mod panels;
pub mod providers;
pub mod stats;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use xt_domain::error::Error;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        // Asks (core runtime)
        .route("/v1/ask", post(ask::ask))
        // Context reads
        .route("/v1/context", post(context::get_context))
        // Panels
        .route("/v1/panels/:id/transcript", get(panels::get_transcript))
        .route("/v1/panels/:id/stop", post(panels::stop))
        // Providers / models
        .route("/v1/models", get(providers::list_models))
        // Counters
        .route("/v1/stats", get(stats::get_stats))
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Map a domain error onto an HTTP status.
pub(crate) fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Provider { .. } => StatusCode::BAD_GATEWAY,
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    api_error(status, err.to_string())
}
