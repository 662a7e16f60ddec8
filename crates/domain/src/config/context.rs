use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context cache + assembly budgets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// How long a cached context slice stays valid.
    #[serde(default = "d_300")]
    pub ttl_secs: u64,
    /// History turns included per request when the caller does not say.
    #[serde(default = "d_10")]
    pub default_turns: usize,
    /// Upper bound a caller-supplied budget is clamped to (hard cap 99).
    #[serde(default = "d_99")]
    pub max_turns: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            default_turns: 10,
            max_turns: 99,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_300() -> u64 {
    300
}
fn d_10() -> usize {
    10
}
fn d_99() -> usize {
    99
}
