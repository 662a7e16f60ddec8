//! Per-panel cancellation tokens.
//!
//! Each in-flight ask registers a token under its panel id. `POST
//! /v1/panels/:id/stop` cancels it, which aborts the provider call; turns
//! already written to the transcript stay written.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Tracks active cancellation tokens per panel.
#[derive(Default)]
pub struct CancelMap {
    tokens: Mutex<HashMap<u32, CancellationToken>>,
}

impl CancelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new cancel token for a panel. A second ask on
    /// the same panel replaces the previous token; the earlier ask keeps its
    /// own handle and is unaffected.
    pub fn register(&self, panel_id: u32) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.lock().insert(panel_id, token.clone());
        token
    }

    /// Cancel the in-flight ask for a panel. Returns true if one was found.
    pub fn cancel(&self, panel_id: u32) -> bool {
        match self.tokens.lock().get(&panel_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove the token for a panel (called when an ask completes).
    pub fn remove(&self, panel_id: u32) {
        self.tokens.lock().remove(&panel_id);
    }

    /// Check if a panel has an ask in flight.
    pub fn is_running(&self, panel_id: u32) -> bool {
        self.tokens.lock().contains_key(&panel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_cancel() {
        let map = CancelMap::new();
        let token = map.register(1);
        assert!(map.is_running(1));
        assert!(!token.is_cancelled());

        assert!(map.cancel(1));
        assert!(token.is_cancelled());

        map.remove(1);
        assert!(!map.is_running(1));
        assert!(!map.cancel(1));
    }

    #[test]
    fn cancel_unknown_panel_returns_false() {
        let map = CancelMap::new();
        assert!(!map.cancel(42));
        assert!(!map.is_running(42));
    }

    #[test]
    fn register_replaces_previous_token() {
        let map = CancelMap::new();
        let old = map.register(1);
        let new = map.register(1);

        map.cancel(1);
        assert!(new.is_cancelled());
        // The orphaned token is untouched.
        assert!(!old.is_cancelled());
    }

    #[test]
    fn remove_is_idempotent() {
        let map = CancelMap::new();
        map.register(1);
        map.remove(1);
        map.remove(1);
        assert!(!map.is_running(1));
    }

    #[test]
    fn panels_are_independent() {
        let map = CancelMap::new();
        let a = map.register(1);
        let b = map.register(2);
        map.cancel(1);
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
