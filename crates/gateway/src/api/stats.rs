//! `GET /v1/stats`: cache and store counters.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = state.context.stats();
    let store = state.store.stats();
    Json(serde_json::json!({
        "cache": {
            "hits": ctx.cache_hits,
            "misses": ctx.cache_misses,
            "keys": ctx.cached_keys,
        },
        "store": {
            "appends": store.appends,
            "queries": store.queries,
        },
    }))
}
