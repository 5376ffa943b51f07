//! In-memory storage engine
//!
//! A deterministic, in-process implementation of the storage engine contract.
//! It backs the test suites and doubles as a reference for the scan semantics a
//! native engine must provide: inclusive lower bound, exclusive upper bound,
//! skip of the exact start key on resumption, and page-limit driven
//! `has_more`/`last_key` continuation.
//!
//! Shards are registered under their directory path; opening an unregistered
//! path fails the same way a missing store would. Secondary opens are recorded
//! so callers can assert on read-replica usage.

use crate::engine::{EngineHandle, StorageEngine};
use crate::error::TracehouseError;
use crate::structures::ScanPage;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct Registry {
    shards: HashMap<PathBuf, BTreeMap<String, String>>,
    fail_open: HashSet<PathBuf>,
    secondary_opens: Vec<PathBuf>,
}

/// In-memory engine over a registry of sorted key-value shards
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    registry: Arc<Mutex<Registry>>,
}

impl MemoryEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty shard under the given path
    pub fn register_shard(&self, path: impl AsRef<Path>) {
        self.registry
            .lock()
            .shards
            .entry(path.as_ref().to_path_buf())
            .or_default();
    }

    /// Insert a record into a shard, registering the shard if needed
    pub fn insert(&self, path: impl AsRef<Path>, key: impl Into<String>, value: impl Into<String>) {
        self.registry
            .lock()
            .shards
            .entry(path.as_ref().to_path_buf())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Force subsequent opens of this path to fail
    pub fn fail_open(&self, path: impl AsRef<Path>) {
        self.registry
            .lock()
            .fail_open
            .insert(path.as_ref().to_path_buf());
    }

    /// Scratch catalog paths observed on secondary opens, in open order
    pub fn secondary_opens(&self) -> Vec<PathBuf> {
        self.registry.lock().secondary_opens.clone()
    }

    /// Number of records registered under a shard path
    pub fn shard_len(&self, path: impl AsRef<Path>) -> usize {
        self.registry
            .lock()
            .shards
            .get(path.as_ref())
            .map_or(0, |m| m.len())
    }
}

impl StorageEngine for MemoryEngine {
    type Handle = MemoryHandle;

    fn open(
        &self,
        primary: &Path,
        secondary: Option<&Path>,
    ) -> Result<Self::Handle, TracehouseError> {
        let mut registry = self.registry.lock();

        if registry.fail_open.contains(primary) {
            return Err(TracehouseError::engine("open", primary, "forced failure"));
        }

        let records = registry
            .shards
            .get(primary)
            .cloned()
            .ok_or_else(|| TracehouseError::engine("open", primary, "shard not registered"))?;

        if let Some(scratch) = secondary {
            registry.secondary_opens.push(scratch.to_path_buf());
        }

        Ok(MemoryHandle { records })
    }
}

/// Read-only snapshot handle over one in-memory shard
#[derive(Debug)]
pub struct MemoryHandle {
    records: BTreeMap<String, String>,
}

impl EngineHandle for MemoryHandle {
    fn scan(
        &mut self,
        filter: &str,
        start_key: &str,
        end_key: &str,
        page_limit: i64,
    ) -> Result<ScanPage, TracehouseError> {
        let lower = if start_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start_key)
        };
        let upper = if end_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end_key)
        };

        let mut page = ScanPage::default();
        for (key, value) in self.records.range::<str, _>((lower, upper)) {
            // Resuming from last_key must not re-emit the record that produced it.
            if key == start_key {
                continue;
            }
            if !filter.is_empty() && !value.contains(filter) {
                continue;
            }
            page.values.push(value.clone());
            if page_limit >= 0 && page.values.len() as i64 >= page_limit {
                page.has_more = true;
                page.last_key = key.clone();
                break;
            }
        }
        Ok(page)
    }
}
