//! Append-only JSONL transcript store.
//!
//! Each panel gets a `panel-<id>.jsonl` file under the store directory.
//! Every turn is appended as a single JSON line and never rewritten; the
//! store is the sole durable source of truth for conversation history.
//!
//! Appends run under a store-wide mutex (single-writer discipline); reads
//! are unguarded and may race an in-flight append: a reader either sees a
//! turn or it doesn't, never a torn line, because each append is one
//! `write_all` of complete lines on a file opened in append mode.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use xt_domain::error::{Error, Result};
use xt_domain::turn::Turn;

/// Counters surfaced by the gateway stats endpoint.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub appends: u64,
    pub queries: u64,
}

/// Durable, queryable log of turns, one JSONL file per panel.
pub struct TranscriptStore {
    base_dir: PathBuf,
    append_lock: Arc<Mutex<()>>,
    appends: AtomicU64,
    queries: AtomicU64,
}

impl TranscriptStore {
    /// Open (or create) the store directory.
    pub fn new(base_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_dir)
            .map_err(|e| Error::Storage(format!("creating {}: {e}", base_dir.display())))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            append_lock: Arc::new(Mutex::new(())),
            appends: AtomicU64::new(0),
            queries: AtomicU64::new(0),
        })
    }

    /// Append one turn to its panel's transcript (sync).
    ///
    /// Assigns the turn id and returns it. The write happens under the
    /// append lock so concurrent appends hit the file one at a time.
    pub fn append(&self, mut turn: Turn) -> Result<Uuid> {
        let id = Uuid::new_v4();
        turn.id = Some(id);

        let path = self.panel_path(turn.panel_id);
        let line = serialize_line(&turn)?;

        {
            let _guard = self.append_lock.lock();
            write_line(&path, &line)?;
        }

        self.appends.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(panel_id = turn.panel_id, turn_id = %id, "turn appended");
        Ok(id)
    }

    /// Append one turn (async). Uses `spawn_blocking` to keep file I/O off
    /// the tokio runtime.
    pub async fn append_async(&self, mut turn: Turn) -> Result<Uuid> {
        let id = Uuid::new_v4();
        turn.id = Some(id);

        let panel_id = turn.panel_id;
        let path = self.panel_path(panel_id);
        let line = serialize_line(&turn)?;
        let lock = self.append_lock.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = lock.lock();
            write_line(&path, &line)
        })
        .await
        .map_err(|e| Error::Storage(format!("spawn_blocking join: {e}")))??;

        self.appends.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(panel_id, turn_id = %id, "turn appended");
        Ok(id)
    }

    /// Read every turn whose panel id is in `panel_ids`, ascending by
    /// `created_at` (sync). Empty input returns an empty vec without
    /// touching the filesystem.
    pub fn query(&self, panel_ids: &[u32]) -> Result<Vec<Turn>> {
        if panel_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.queries.fetch_add(1, Ordering::Relaxed);

        let mut turns = Vec::new();
        for panel_id in dedup_ids(panel_ids) {
            read_panel_file(&self.panel_path(panel_id), panel_id, &mut turns)?;
        }
        // Stable: per-panel append order survives equal timestamps.
        turns.sort_by_key(|t| t.created_at);
        Ok(turns)
    }

    /// Read turns for a set of panels (async, via `spawn_blocking`).
    pub async fn query_async(&self, panel_ids: &[u32]) -> Result<Vec<Turn>> {
        if panel_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.queries.fetch_add(1, Ordering::Relaxed);

        let paths: Vec<(u32, PathBuf)> = dedup_ids(panel_ids)
            .into_iter()
            .map(|id| (id, self.panel_path(id)))
            .collect();

        tokio::task::spawn_blocking(move || {
            let mut turns = Vec::new();
            for (panel_id, path) in &paths {
                read_panel_file(path, *panel_id, &mut turns)?;
            }
            turns.sort_by_key(|t| t.created_at);
            Ok(turns)
        })
        .await
        .map_err(|e| Error::Storage(format!("spawn_blocking join: {e}")))?
    }

    /// Snapshot the append/query counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            appends: self.appends.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
        }
    }

    fn panel_path(&self, panel_id: u32) -> PathBuf {
        self.base_dir.join(format!("panel-{panel_id}.jsonl"))
    }
}

// ── Private helpers ───────────────────────────────────────────────

/// Sorted, de-duplicated copy of the requested panel ids.
fn dedup_ids(panel_ids: &[u32]) -> Vec<u32> {
    let mut ids = panel_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn serialize_line(turn: &Turn) -> Result<String> {
    let mut line = serde_json::to_string(turn)
        .map_err(|e| Error::Storage(format!("serializing turn: {e}")))?;
    line.push('\n');
    Ok(line)
}

fn write_line(path: &Path, line: &str) -> Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Storage(format!("opening {}: {e}", path.display())))?;
    file.write_all(line.as_bytes())
        .map_err(|e| Error::Storage(format!("appending to {}: {e}", path.display())))?;
    Ok(())
}

/// Read and parse one panel's JSONL file into `out`. A missing file is an
/// empty transcript, not an error. Malformed lines are skipped with a
/// warning so one bad write never poisons the whole panel.
fn read_panel_file(path: &Path, panel_id: u32, out: &mut Vec<Turn>) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Storage(format!("reading {}: {e}", path.display())))?;

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Turn>(line) {
            Ok(turn) => out.push(turn),
            Err(e) => {
                tracing::warn!(panel_id, error = %e, "skipping malformed transcript line");
            }
        }
    }
    Ok(())
}
