use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a turn.
///
/// `Assistant` carries the model name that answered so a transcript can mix
/// models panel by panel (the UI labels each answer with its model).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Speaker {
    Human,
    Assistant { model: String },
    System,
}

/// One message within a panel's transcript.
///
/// Turns are immutable once appended; the store only ever adds new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Assigned by the transcript store at append time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub panel_id: u32,
    pub speaker: Speaker,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Approximate token length of `body`. `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u32>,
    /// System prompt in effect when this turn was produced, denormalized
    /// onto the turn for audit/replay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Turn {
    /// Build a turn timestamped now, with an estimated token count.
    pub fn new(panel_id: u32, speaker: Speaker, body: impl Into<String>) -> Self {
        let body = body.into();
        let token_count = Some(approx_tokens(&body));
        Self {
            id: None,
            panel_id,
            speaker,
            body,
            created_at: Utc::now(),
            token_count,
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.is_empty());
        self
    }
}

/// Rough token estimate: ~4 chars per token, never zero for non-empty text.
pub fn approx_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }
    (text.chars().count() as u32 / 4).max(1)
}
