use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use xt_domain::error::Result;
use xt_domain::turn::Turn;
use xt_store::TranscriptStore;

use crate::cache::ContextCache;

/// Counters exposed over the stats endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ContextStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cached_keys: usize,
}

/// Read and write path over the transcript store, with the context cache
/// in front of reads.
///
/// Writes are non-transactional by design: the append lands first, then the
/// affected cache keys are dropped. A concurrent reader may briefly see a
/// stale cached slice, bounded by the TTL.
pub struct ContextService {
    store: Arc<TranscriptStore>,
    cache: ContextCache,
}

impl ContextService {
    pub fn new(store: Arc<TranscriptStore>, ttl: Duration) -> Self {
        Self {
            store,
            cache: ContextCache::new(ttl),
        }
    }

    /// Fetch the merged transcript slice for a set of panels, serving from
    /// the cache when a fresh entry exists.
    pub async fn get_context(&self, panel_ids: &[u32]) -> Result<Vec<Turn>> {
        if panel_ids.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(turns) = self.cache.get(panel_ids) {
            return Ok(turns);
        }
        let turns = self.store.query_async(panel_ids).await?;
        self.cache.populate(panel_ids, turns.clone());
        Ok(turns)
    }

    /// Durably append a turn, then drop every cached slice that includes its
    /// panel. Append-then-invalidate ordering means a cache rebuild after
    /// this returns always sees the new turn.
    pub async fn record_turn(&self, turn: Turn) -> Result<uuid::Uuid> {
        let panel_id = turn.panel_id;
        let id = self.store.append_async(turn).await?;
        let dropped = self.cache.invalidate(panel_id);
        debug!(panel_id, dropped, "turn recorded, cache invalidated");
        Ok(id)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats {
            cache_hits: self.cache.hit_count(),
            cache_misses: self.cache.miss_count(),
            cached_keys: self.cache.len(),
        }
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }
}
