//! Core data structures for Tracehouse
//!
//! This module defines the shared value types that flow through a federated
//! query: the per-shard cursor state that clients round-trip between calls, the
//! transient page produced by one engine scan, and the request/response shapes
//! consumed from the transport layer.

use serde::{Deserialize, Serialize};

/// Lifecycle status of one shard's cursor
///
/// Transitions only move forward: `NotStarted → InProgress → {Finished, Error}`.
/// A terminal status permanently excludes the shard from further scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShardStatus {
    /// The shard has never been scanned for this cursor
    #[default]
    NotStarted,
    /// At least one scan call has been issued
    InProgress,
    /// The key range is exhausted; nothing more to return
    Finished,
    /// The shard failed to open or scan; terminal
    Error,
}

impl ShardStatus {
    /// Whether this status permanently excludes the shard from scanning
    pub fn is_terminal(self) -> bool {
        matches!(self, ShardStatus::Finished | ShardStatus::Error)
    }
}

/// Resumable cursor state for one shard
///
/// ShardState is round-tripped by value through request/response so a scan can
/// resume across independent, possibly load-balanced calls without any
/// server-side cursor store. The shard's absolute directory path is its stable
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardState {
    /// Absolute path of the shard directory
    pub path: String,
    /// Cursor lifecycle status
    #[serde(default)]
    pub status: ShardStatus,
    /// Whether the shard may still hold unreturned records
    #[serde(default)]
    pub has_more: bool,
    /// Continuation key from the last bounded scan; empty when fresh or exhausted
    #[serde(default)]
    pub last_key: String,
}

impl ShardState {
    /// Create a fresh cursor for a newly discovered shard
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: ShardStatus::NotStarted,
            has_more: true,
            last_key: String::new(),
        }
    }

    /// Whether a scan call would do any work for this cursor
    pub fn is_scannable(&self) -> bool {
        !self.status.is_terminal() && self.has_more
    }
}

/// Output of one bounded engine scan; transient, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanPage {
    /// Matching record values in key order
    pub values: Vec<String>,
    /// Whether the range holds more records past `last_key`
    pub has_more: bool,
    /// Key of the last returned record when `has_more` is set
    pub last_key: String,
}

/// Records returned for one shard in a response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShardData {
    /// Raw record values in scan order
    pub items: Vec<String>,
}

/// One federated query request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Opaque filter expression forwarded verbatim to the storage engine
    #[serde(default)]
    pub query: String,
    /// Optional identity filter; when present, scan bounds are prefixed with it
    #[serde(default)]
    pub user_id: Option<String>,
    /// Window start, engine-native time units
    pub start: i64,
    /// Window end, engine-native time units
    pub end: i64,
    /// Cursor state echoed back from a previous response, keyed by shard path
    #[serde(default)]
    pub shards: Vec<ShardState>,
}

impl QueryRequest {
    /// Create a request for a bare time window
    pub fn new(query: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            query: query.into(),
            user_id: None,
            start,
            end,
            shards: Vec::new(),
        }
    }

    /// Set the identity filter
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach cursor state from a previous response
    pub fn shards(mut self, shards: Vec<ShardState>) -> Self {
        self.shards = shards;
        self
    }
}

/// One federated query response
///
/// `data` carries one slot per shard in `shards`, in the same order, so callers
/// can map results back to their originating shard. Terminal shards contribute
/// `None`. The `shards` list must be echoed back verbatim to resume a
/// truncated scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Per-shard result slots, aligned with `shards`
    pub data: Vec<Option<ShardData>>,
    /// Updated cursor state for the next call
    pub shards: Vec<ShardState>,
    /// Response status code
    pub code: u16,
}

impl QueryResponse {
    /// Total number of records across all data slots
    pub fn total_records(&self) -> usize {
        self.data
            .iter()
            .map(|slot| slot.as_ref().map_or(0, |d| d.items.len()))
            .sum()
    }

    /// Whether any shard can still produce records on a follow-up call
    pub fn has_remaining(&self) -> bool {
        self.shards.iter().any(|s| s.is_scannable())
    }
}
