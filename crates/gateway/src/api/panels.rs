//! Per-panel endpoints.
//!
//! - `GET /v1/panels/:id/transcript`: the panel's full transcript
//! - `POST /v1/panels/:id/stop`: cancel the panel's in-flight ask

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::api::{api_error, error_response};
use crate::state::AppState;

pub async fn get_transcript(
    State(state): State<AppState>,
    Path(panel_id): Path<u32>,
) -> Response {
    if panel_id == 0 {
        return api_error(StatusCode::BAD_REQUEST, "panel_id must be >= 1");
    }
    match state.context.get_context(&[panel_id]).await {
        Ok(turns) => Json(serde_json::json!({
            "panel_id": panel_id,
            "turns": turns,
            "count": turns.len(),
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn stop(State(state): State<AppState>, Path(panel_id): Path<u32>) -> Response {
    let stopped = state.cancel_map.cancel(panel_id);
    if stopped {
        tracing::info!(panel_id, "stop requested");
    }
    Json(serde_json::json!({
        "panel_id": panel_id,
        "stopped": stopped,
    }))
    .into_response()
}
