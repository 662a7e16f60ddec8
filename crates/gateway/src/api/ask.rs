//! `POST /v1/ask`: run one question/answer turn for a panel.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use xt_domain::message::Usage;
use xt_domain::turn::Turn;

use crate::api::error_response;
use crate::runtime::{run_ask, AskInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Panel the question (and answer) are recorded under.
    pub panel_id: u32,
    pub question: String,
    /// Model override (e.g. "gpt-4o" or "nvidia/meta/llama-3.1-70b-instruct").
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Context slice to assemble the prompt from, possibly spanning panels.
    #[serde(default)]
    pub context: Vec<Turn>,
    /// History turns to keep; clamped server-side.
    #[serde(default)]
    pub turn_budget: Option<usize>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<Usage>,
    user_turn_id: uuid::Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    assistant_turn_id: Option<uuid::Uuid>,
    stopped: bool,
}

pub async fn ask(State(state): State<AppState>, Json(body): Json<AskRequest>) -> Response {
    let input = AskInput {
        panel_id: body.panel_id,
        question: body.question,
        model: body.model,
        system_prompt: body.system_prompt,
        context: body.context,
        turn_budget: body.turn_budget,
    };

    match run_ask(&state, input).await {
        Ok(out) => Json(AskResponse {
            answer: out.answer,
            model: out.model,
            usage: out.usage,
            user_turn_id: out.user_turn_id,
            assistant_turn_id: out.assistant_turn_id,
            stopped: out.stopped,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
