//! In-memory TTL cache mapping a panel-id set to its materialized
//! transcript slice.
//!
//! Keys are canonical: two requests naming the same set in different orders
//! or with duplicates collide on the same entry. Expiry is checked lazily at
//! `get` time: there is no background sweep: and writes to any member
//! panel remove the whole entry (all-or-nothing invalidation: the next read
//! goes back to the store).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use xt_domain::turn::Turn;

/// Derive the canonical cache key for a panel-id set: sorted ascending,
/// de-duplicated, comma-joined (`[2, 1, 2]` → `"1,2"`).
pub fn canonical_key(panel_ids: &[u32]) -> String {
    let mut ids = panel_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a canonical key back into its panel ids.
fn key_members(key: &str) -> impl Iterator<Item = u32> + '_ {
    key.split(',').filter_map(|part| part.parse().ok())
}

struct CacheEntry {
    turns: Vec<Turn>,
    cached_at: Instant,
}

/// Process-wide context cache. All operations take one mutex: `invalidate`
/// scans and removes, which must not interleave with `populate`.
pub struct ContextCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ContextCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached slice for this panel set, or `None` on a miss.
    /// An expired entry counts as a miss and is removed on the spot.
    pub fn get(&self, panel_ids: &[u32]) -> Option<Vec<Turn>> {
        let key = canonical_key(panel_ids);
        let mut entries = self.entries.lock();

        match entries.get(&key) {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "context cache hit");
                Some(entry.turns.clone())
            }
            Some(_) => {
                // Lazy eviction: expired-but-present is treated as absent.
                entries.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "context cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or overwrite the entry for this panel set.
    pub fn populate(&self, panel_ids: &[u32], turns: Vec<Turn>) {
        let key = canonical_key(panel_ids);
        tracing::debug!(key = %key, turns = turns.len(), "context cache populated");
        self.entries.lock().insert(
            key,
            CacheEntry {
                turns,
                cached_at: Instant::now(),
            },
        );
    }

    /// Remove every entry whose key set contains `panel_id`. Returns the
    /// number of entries dropped; zero is a normal no-op, not an error.
    ///
    /// O(entries × ids-per-entry), fine while the number of distinct cached
    /// key-sets stays small (bounded by panel combinations in practice).
    pub fn invalidate(&self, panel_id: u32) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key_members(key).any(|id| id == panel_id));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(panel_id, removed, "context cache invalidated");
        }
        removed
    }

    /// Drop all entries (graceful shutdown).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xt_domain::turn::{Speaker, Turn};

    fn turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| Turn::new(1, Speaker::Human, format!("t{i}")))
            .collect()
    }

    #[test]
    fn key_ignores_order_and_duplicates() {
        assert_eq!(canonical_key(&[2, 1, 2]), canonical_key(&[1, 2]));
        assert_eq!(canonical_key(&[4, 2, 1]), "1,2,4");
        assert_eq!(canonical_key(&[]), "");
    }

    #[test]
    fn populate_then_get_hits_regardless_of_order() {
        let cache = ContextCache::new(Duration::from_secs(60));
        cache.populate(&[1, 3], turns(2));

        let got = cache.get(&[3, 1]).expect("hit");
        assert_eq!(got.len(), 2);
        assert_eq!(cache.hit_count(), 1);
        assert_eq!(cache.miss_count(), 0);
    }

    #[test]
    fn invalidation_is_precise() {
        let cache = ContextCache::new(Duration::from_secs(60));
        cache.populate(&[1, 2], turns(1));
        cache.populate(&[3], turns(1));

        assert_eq!(cache.invalidate(2), 1);
        assert!(cache.get(&[1, 2]).is_none());
        assert!(cache.get(&[3]).is_some());
    }

    #[test]
    fn invalidating_an_uncached_panel_is_a_no_op() {
        let cache = ContextCache::new(Duration::from_secs(60));
        cache.populate(&[1], turns(1));
        assert_eq!(cache.invalidate(9), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = ContextCache::new(Duration::from_millis(30));
        cache.populate(&[1], turns(1));

        assert!(cache.get(&[1]).is_some(), "fresh entry is a hit");
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&[1]).is_none(), "expired entry is a miss");
        // Lazy eviction removed it.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn populate_overwrites_existing_entry() {
        let cache = ContextCache::new(Duration::from_secs(60));
        cache.populate(&[1], turns(1));
        cache.populate(&[1], turns(5));
        assert_eq!(cache.get(&[1]).unwrap().len(), 5);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_everything() {
        let cache = ContextCache::new(Duration::from_secs(60));
        cache.populate(&[1], turns(1));
        cache.populate(&[2, 3], turns(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
