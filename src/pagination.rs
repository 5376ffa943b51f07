//! Per-shard pagination state machine
//!
//! One request drives at most one bounded scan per shard. The scanner enforces
//! the cursor lifecycle: terminal or exhausted shards are skipped untouched,
//! live shards move to `InProgress`, resume from their continuation key, issue
//! exactly one engine scan, and land in `Finished` once the range is drained.
//! Open and scan failures are terminal for the shard but invisible to the
//! request — the caller just sees an empty contribution.

use crate::engine::{EngineHandle, StorageEngine};
use crate::secondary::SecondaryManager;
use crate::structures::{ShardState, ShardStatus};
use std::path::Path;
use tracing::{debug, error};

/// Filter and key bounds shared by every shard in one request
#[derive(Debug, Clone, Copy)]
pub struct ScanRange<'a> {
    /// Opaque filter expression forwarded verbatim to the engine
    pub filter: &'a str,
    /// Window start key; a shard's own `last_key` takes precedence on resume
    pub start_key: &'a str,
    /// Exclusive upper key bound; empty means unbounded
    pub end_key: &'a str,
}

/// Drives the per-shard cursor state machine
pub struct ShardScanner<'a, E: StorageEngine> {
    engine: &'a E,
    secondary: &'a SecondaryManager,
}

impl<'a, E: StorageEngine> ShardScanner<'a, E> {
    /// Create a scanner over the given engine and replica manager
    pub fn new(engine: &'a E, secondary: &'a SecondaryManager) -> Self {
        Self { engine, secondary }
    }

    /// Issue one bounded scan for a shard, updating its cursor in place
    ///
    /// Returns the page's values. A shard that is terminal or has no more data
    /// contributes nothing and is left unchanged.
    pub fn scan_shard(
        &self,
        state: &mut ShardState,
        requires_secondary: bool,
        range: &ScanRange<'_>,
        page_limit: i64,
    ) -> Vec<String> {
        if !state.is_scannable() {
            debug!(shard = %state.path, status = ?state.status, "skipping shard");
            return Vec::new();
        }

        state.status = ShardStatus::InProgress;

        let mut session = match self.secondary.open_shard(
            self.engine,
            Path::new(&state.path),
            requires_secondary,
        ) {
            Ok(session) => session,
            Err(e) => {
                error!(shard = %state.path, error = %e, "failed to open shard");
                state.status = ShardStatus::Error;
                return Vec::new();
            }
        };

        // Resume from the continuation key when one exists.
        let start_key = if state.last_key.is_empty() {
            range.start_key.to_string()
        } else {
            state.last_key.clone()
        };

        let page = match session
            .handle_mut()
            .scan(range.filter, &start_key, range.end_key, page_limit)
        {
            Ok(page) => page,
            Err(e) => {
                error!(shard = %state.path, error = %e, "shard scan failed");
                state.status = ShardStatus::Error;
                return Vec::new();
            }
        };

        if page.has_more {
            state.has_more = true;
            state.last_key = page.last_key;
        } else {
            state.has_more = false;
            state.last_key.clear();
            state.status = ShardStatus::Finished;
        }

        page.values
    }
}
