//! The ask turn: the core write path.
//!
//! Ordering is deliberate: the user turn is recorded before the provider is
//! called, so a panel's transcript keeps the question even when the provider
//! fails or the ask is stopped. The assistant turn is only written on a
//! successful completion.

use xt_context::{assemble, clamp_budget, ContextRequest};
use xt_domain::error::{Error, Result};
use xt_domain::message::Usage;
use xt_domain::turn::{Speaker, Turn};
use xt_providers::{ChatRequest, ChatResponse};

use crate::state::AppState;

pub struct AskInput {
    pub panel_id: u32,
    pub question: String,
    /// Model override; `None` routes to the configured default.
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    /// The context slice chosen by the caller, possibly spanning panels.
    pub context: Vec<Turn>,
    pub turn_budget: Option<usize>,
}

#[derive(Debug)]
pub struct AskOutput {
    pub answer: String,
    pub model: String,
    pub usage: Option<Usage>,
    pub user_turn_id: uuid::Uuid,
    /// `None` when the ask was stopped before the provider answered.
    pub assistant_turn_id: Option<uuid::Uuid>,
    pub stopped: bool,
}

pub async fn run_ask(state: &AppState, input: AskInput) -> Result<AskOutput> {
    validate(&input)?;

    let budget = clamp_budget(
        input.turn_budget,
        state.config.context.default_turns,
        state.config.context.max_turns,
    );

    // 1. The question becomes part of the transcript first.
    let user_turn = Turn::new(input.panel_id, Speaker::Human, input.question.trim())
        .with_system_prompt(input.system_prompt.clone());
    let user_turn_id = state.context.record_turn(user_turn).await?;

    // 2. Assemble the provider payload from the caller's context slice.
    let mut panel_ids: Vec<u32> = input.context.iter().map(|t| t.panel_id).collect();
    panel_ids.sort_unstable();
    panel_ids.dedup();
    let messages = assemble(
        &input.context,
        &ContextRequest {
            panel_ids,
            turn_budget: budget,
            system_prompt: input.system_prompt.clone(),
            question: input.question.trim().to_string(),
        },
    );

    // 3. Route and call the provider, raced against the panel's stop token.
    let resolved = state.llm.resolve(input.model.as_deref())?;
    let chat_req = ChatRequest {
        messages,
        temperature: Some(state.config.llm.temperature),
        max_tokens: state.config.llm.max_tokens,
        model: Some(resolved.model.clone()),
    };

    let token = state.cancel_map.register(input.panel_id);
    let outcome = tokio::select! {
        _ = token.cancelled() => None,
        resp = resolved.provider.chat(&chat_req) => Some(resp),
    };
    state.cancel_map.remove(input.panel_id);

    let resp = match outcome {
        None => {
            tracing::info!(panel_id = input.panel_id, "ask stopped before completion");
            return Ok(AskOutput {
                answer: String::new(),
                model: resolved.model,
                usage: None,
                user_turn_id,
                assistant_turn_id: None,
                stopped: true,
            });
        }
        Some(resp) => resp?,
    };

    // 4. Record the answer.
    let turn = assistant_turn(input.panel_id, &resolved.model, &resp);
    let model = match &turn.speaker {
        Speaker::Assistant { model } => model.clone(),
        _ => resolved.model.clone(),
    };
    let assistant_turn_id = state.context.record_turn(turn).await?;

    tracing::info!(
        panel_id = input.panel_id,
        model = %model,
        total_tokens = resp.usage.map(|u| u.total_tokens).unwrap_or(0),
        "ask completed"
    );

    Ok(AskOutput {
        answer: resp.content,
        model,
        usage: resp.usage,
        user_turn_id,
        assistant_turn_id: Some(assistant_turn_id),
        stopped: false,
    })
}

fn validate(input: &AskInput) -> Result<()> {
    if input.panel_id == 0 {
        return Err(Error::Validation("panel_id must be >= 1".into()));
    }
    if input.question.trim().is_empty() {
        return Err(Error::Validation("question must not be empty".into()));
    }
    Ok(())
}

/// Build the assistant turn from a provider response. The provider's reported
/// usage total replaces the character-based token estimate when present.
fn assistant_turn(panel_id: u32, requested_model: &str, resp: &ChatResponse) -> Turn {
    let model = if resp.model.is_empty() || resp.model == "unknown" {
        requested_model.to_string()
    } else {
        resp.model.clone()
    };
    let mut turn = Turn::new(panel_id, Speaker::Assistant { model }, &resp.content);
    if let Some(usage) = resp.usage {
        turn.token_count = Some(usage.total_tokens);
    }
    turn
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(panel_id: u32, question: &str) -> AskInput {
        AskInput {
            panel_id,
            question: question.into(),
            model: None,
            system_prompt: None,
            context: Vec::new(),
            turn_budget: None,
        }
    }

    #[test]
    fn rejects_panel_zero_and_blank_question() {
        assert!(matches!(
            validate(&input(0, "hi")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate(&input(1, "   ")),
            Err(Error::Validation(_))
        ));
        assert!(validate(&input(1, "hi")).is_ok());
    }

    #[test]
    fn assistant_turn_prefers_reported_usage_and_model() {
        let resp = ChatResponse {
            content: "answer".into(),
            usage: Some(Usage {
                prompt_tokens: 40,
                completion_tokens: 2,
                total_tokens: 42,
            }),
            model: "gpt-4o-mini-2024".into(),
            finish_reason: Some("stop".into()),
        };
        let turn = assistant_turn(3, "gpt-4o-mini", &resp);
        assert_eq!(turn.token_count, Some(42));
        assert_eq!(
            turn.speaker,
            Speaker::Assistant {
                model: "gpt-4o-mini-2024".into()
            }
        );
    }

    #[test]
    fn assistant_turn_falls_back_without_usage() {
        let resp = ChatResponse {
            content: "four char blocks".into(),
            usage: None,
            model: "unknown".into(),
            finish_reason: None,
        };
        let turn = assistant_turn(1, "meta/llama-3.1-8b-instruct", &resp);
        // Estimated from the body, not zero.
        assert!(turn.token_count.unwrap() > 0);
        assert_eq!(
            turn.speaker,
            Speaker::Assistant {
                model: "meta/llama-3.1-8b-instruct".into()
            }
        );
    }
}
