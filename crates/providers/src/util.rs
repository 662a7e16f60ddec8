//! Shared utility functions for provider adapters.

use xt_domain::config::ProviderConfig;
use xt_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the API key for a provider.
///
/// Precedence:
/// 1. `api_key` field (plaintext, logged with a warning)
/// 2. `api_key_env` (reads environment variable; error when unset)
/// 3. `None`: the adapter sends no Authorization header (local endpoints
///    like Ollama accept this)
pub fn resolve_api_key(cfg: &ProviderConfig) -> Result<Option<String>> {
    if let Some(ref key) = cfg.api_key {
        tracing::warn!(
            provider_id = %cfg.id,
            "API key loaded from plaintext config field 'api_key': \
             prefer 'api_key_env' instead"
        );
        return Ok(Some(key.clone()));
    }

    if let Some(ref env_var) = cfg.api_key_env {
        return std::env::var(env_var).map(Some).map_err(|_| {
            Error::Config(format!(
                "environment variable '{env_var}' not set or not valid UTF-8"
            ))
        });
    }

    Ok(None)
}
