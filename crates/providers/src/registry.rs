//! Provider registry and model routing.
//!
//! Constructs and holds all configured LLM provider instances. At startup the
//! registry reads the [`LlmConfig`], resolves authentication (env vars, direct
//! keys), and instantiates an adapter for each configured provider.
//!
//! Routing a model name to a provider follows, in order:
//! 1. longest matching entry in any provider's `model_prefixes`;
//! 2. a `provider_id/model` name whose head is a registered provider;
//! 3. the first registered provider, with the name passed through.

use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::LlmProvider;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use xt_domain::config::LlmConfig;
use xt_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProviderRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider with the concrete model name resolved for a request.
pub struct Resolved {
    pub provider: Arc<dyn LlmProvider>,
    pub model: String,
}

/// One entry of the `/v1/models` listing.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredModel {
    pub provider_id: String,
    pub default_model: String,
    pub model_prefixes: Vec<String>,
}

/// Holds all instantiated LLM providers and the prefix routing table.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    /// Config order of successfully registered providers; the first entry is
    /// the fallback for unrouted requests.
    order: Vec<String>,
    /// `(prefix, provider_id)`, longest prefix first.
    prefixes: Vec<(String, String)>,
    default_model: Option<String>,
}

impl ProviderRegistry {
    /// Build the registry from the application's [`LlmConfig`].
    ///
    /// Providers that fail to initialize (e.g. a named env var is unset) are
    /// logged and skipped rather than aborting the entire startup.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
        let mut order = Vec::new();
        let mut prefixes: Vec<(String, String)> = Vec::new();

        for pc in &config.providers {
            match OpenAiCompatProvider::from_config(pc, timeout) {
                Ok(provider) => {
                    tracing::info!(provider_id = %pc.id, base_url = %pc.base_url,
                        "registered LLM provider");
                    providers.insert(pc.id.clone(), Arc::new(provider));
                    order.push(pc.id.clone());
                    for prefix in &pc.model_prefixes {
                        if !prefix.is_empty() {
                            prefixes.push((prefix.clone(), pc.id.clone()));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(provider_id = %pc.id, error = %e,
                        "failed to initialize LLM provider, skipping");
                }
            }
        }

        if providers.is_empty() && !config.providers.is_empty() {
            // Dev-friendly default: the gateway still boots (transcripts and
            // context reads work). For fail-fast set XT_REQUIRE_LLM=1.
            let require = std::env::var("XT_REQUIRE_LLM")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false);
            if require {
                return Err(Error::Config(
                    "all configured LLM providers failed to initialize".into(),
                ));
            }
            tracing::warn!("no LLM providers initialized; ask requests will fail");
        }

        // Longest prefix wins when several match.
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));

        Ok(Self {
            providers,
            order,
            prefixes,
            default_model: config.default_model.clone(),
        })
    }

    /// Look up a provider by its config id.
    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(provider_id).cloned()
    }

    /// Route a requested model name (or the configured default) to a
    /// provider and a concrete model name.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Resolved> {
        match requested.filter(|m| !m.is_empty()) {
            Some(model) => self.resolve_name(model),
            None => match self.default_model.as_deref() {
                Some(model) => self.resolve_name(model),
                None => {
                    let provider = self.first_provider()?;
                    let model = provider.default_model().to_string();
                    Ok(Resolved { provider, model })
                }
            },
        }
    }

    fn resolve_name(&self, model: &str) -> Result<Resolved> {
        // 1. Prefix routing; `prefixes` is sorted longest first.
        for (prefix, provider_id) in &self.prefixes {
            if model.starts_with(prefix.as_str()) {
                if let Some(provider) = self.get(provider_id) {
                    return Ok(Resolved {
                        provider,
                        model: model.to_string(),
                    });
                }
            }
        }

        // 2. Explicit `provider_id/model` form.
        if let Some((head, rest)) = model.split_once('/') {
            if let Some(provider) = self.get(head) {
                if !rest.is_empty() {
                    return Ok(Resolved {
                        provider,
                        model: rest.to_string(),
                    });
                }
            }
        }

        // 3. Pass the name through to the fallback provider.
        let provider = self.first_provider()?;
        tracing::debug!(model = %model, provider_id = %provider.provider_id(),
            "model matched no prefix, routed to fallback provider");
        Ok(Resolved {
            provider,
            model: model.to_string(),
        })
    }

    fn first_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        self.order
            .first()
            .and_then(|id| self.get(id))
            .ok_or_else(|| Error::Config("no LLM providers registered".into()))
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// List registered providers in config order, for the models endpoint.
    pub fn list_models(&self) -> Vec<RegisteredModel> {
        self.order
            .iter()
            .filter_map(|id| {
                let provider = self.providers.get(id)?;
                let model_prefixes = self
                    .prefixes
                    .iter()
                    .filter(|(_, pid)| pid == id)
                    .map(|(p, _)| p.clone())
                    .collect();
                Some(RegisteredModel {
                    provider_id: id.clone(),
                    default_model: provider.default_model().to_string(),
                    model_prefixes,
                })
            })
            .collect()
    }
}
