use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider system
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model used when a request names none. Either a bare model name
    /// (routed by prefix) or `provider_id/model`.
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    /// Maximum tokens per completion. `None` lets the provider choose.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "d_120000u")]
    pub request_timeout_ms: u64,
    /// Registered LLM providers (data-driven: adding a provider = adding config).
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_model: None,
            temperature: d_temperature(),
            max_tokens: None,
            request_timeout_ms: 120_000,
            providers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub base_url: String,
    /// Direct key (for config-only setups; prefer `api_key_env`).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Env var containing the key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub default_model: Option<String>,
    /// Model-name prefixes routed to this provider (e.g. `["gpt-"]` for
    /// OpenAI, `["nvidia/", "meta/"]` for an NVIDIA endpoint).
    #[serde(default)]
    pub model_prefixes: Vec<String>,
}

// ── serde default helpers ───────────────────────────────────────────

fn d_temperature() -> f32 {
    0.7
}
fn d_120000u() -> u64 {
    120_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_config_parses_with_prefixes() {
        let toml_str = r#"
            id = "nvidia"
            base_url = "https://integrate.api.nvidia.com/v1"
            api_key_env = "NVIDIA_API_KEY"
            model_prefixes = ["nvidia/", "meta/"]
        "#;
        let cfg: ProviderConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.id, "nvidia");
        assert_eq!(cfg.model_prefixes, vec!["nvidia/", "meta/"]);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn llm_defaults() {
        let cfg = LlmConfig::default();
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.request_timeout_ms, 120_000);
        assert!(cfg.providers.is_empty());
    }
}
