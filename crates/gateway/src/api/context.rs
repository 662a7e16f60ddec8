//! `POST /v1/context`: cache-backed multi-panel transcript read.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::api::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    /// Panels to merge, any order; duplicates are ignored.
    pub panel_ids: Vec<u32>,
}

pub async fn get_context(
    State(state): State<AppState>,
    Json(body): Json<ContextQuery>,
) -> Response {
    match state.context.get_context(&body.panel_ids).await {
        Ok(turns) => Json(serde_json::json!({
            "turns": turns,
            "count": turns.len(),
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}
