//! `GET /v1/models`: registered providers and their routing prefixes.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let models = state.llm.list_models();
    Json(serde_json::json!({
        "default_model": state.config.llm.default_model,
        "providers": models,
    }))
}
