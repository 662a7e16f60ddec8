//! AppState construction extracted from `main.rs`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use xt_context::ContextService;
use xt_domain::config::{Config, ConfigSeverity};
use xt_providers::ProviderRegistry;
use xt_store::TranscriptStore;

use crate::runtime::cancel::CancelMap;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }

    // ── Transcript store ─────────────────────────────────────────────
    let store = Arc::new(
        TranscriptStore::new(&config.store.path).context("initializing transcript store")?,
    );
    tracing::info!(path = %config.store.path.display(), "transcript store ready");

    // ── Context service (cache in front of the store) ────────────────
    let ttl = Duration::from_secs(config.context.ttl_secs);
    let context = Arc::new(ContextService::new(store.clone(), ttl));
    tracing::info!(
        ttl_secs = config.context.ttl_secs,
        default_turns = config.context.default_turns,
        "context service ready"
    );

    // ── LLM providers ────────────────────────────────────────────────
    let llm = Arc::new(
        ProviderRegistry::from_config(&config.llm).context("initializing LLM providers")?,
    );
    if llm.is_empty() {
        tracing::info!("no LLM providers initialized: configure API keys to enable asks");
    } else {
        tracing::info!(providers = llm.len(), "LLM provider registry ready");
    }

    // ── Cancel map (per-panel stop) ──────────────────────────────────
    let cancel_map = Arc::new(CancelMap::new());
    tracing::info!("cancel map ready");

    Ok(AppState {
        config,
        llm,
        store,
        context,
        cancel_map,
    })
}
