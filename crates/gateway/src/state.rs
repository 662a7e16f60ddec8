use std::sync::Arc;

use xt_context::ContextService;
use xt_domain::config::Config;
use xt_providers::ProviderRegistry;
use xt_store::TranscriptStore;

use crate::runtime::cancel::CancelMap;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: Arc<ProviderRegistry>,
    pub store: Arc<TranscriptStore>,
    /// Cached read path + write path over `store`.
    pub context: Arc<ContextService>,
    pub cancel_map: Arc<CancelMap>,
}
