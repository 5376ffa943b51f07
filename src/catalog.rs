//! Shard discovery over the workspace directory tree
//!
//! The workspace is laid out as `root/<producer>/<bucketStartEpochSeconds>/`,
//! one storage shard per bucket directory. The catalog walks exactly those two
//! levels and selects buckets whose fixed-width interval intersects the query
//! window, widened by a small slack to absorb producer clock skew.
//!
//! A bucket containing the `SUCCESS` marker file has been fully written and can
//! be opened directly; a bucket without it may still be under active write and
//! must be opened through a read-replica instead.

use crate::config::TracehouseConfig;
use crate::error::TracehouseError;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Marker file a producer writes once a bucket is complete
pub const SUCCESS_MARKER: &str = "SUCCESS";

/// A closed query time window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Create a window from its bounds
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Window start
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Window end
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Widen both ends by `slack` time units
    pub fn widened(self, slack: i64) -> Self {
        Self {
            start: self.start - slack,
            end: self.end + slack,
        }
    }

    /// Whether the half-open bucket `[bucket_start, bucket_start + interval)`
    /// intersects this window
    pub fn intersects_bucket(&self, bucket_start: i64, interval: i64) -> bool {
        bucket_start <= self.end && self.start < bucket_start + interval
    }
}

/// One discovered shard candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateShard {
    /// Absolute path of the bucket directory
    pub path: PathBuf,
    /// Whether the shard must be opened through a read-replica
    pub requires_secondary: bool,
}

/// Discovers candidate shards for a query window
#[derive(Debug, Clone)]
pub struct ShardCatalog {
    root: PathBuf,
    interval: i64,
    slack: i64,
}

impl ShardCatalog {
    /// Create a catalog over the configured workspace
    pub fn new(config: &TracehouseConfig) -> Self {
        Self {
            root: config.workspace_root.clone(),
            interval: config.bucket_interval,
            slack: config.window_slack,
        }
    }

    /// Create a catalog with explicit parameters
    pub fn with_root(root: impl Into<PathBuf>, interval: i64, slack: i64) -> Self {
        Self {
            root: root.into(),
            interval,
            slack,
        }
    }

    /// Workspace root this catalog walks
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover all shards whose bucket intersects the widened window
    ///
    /// Results are in directory iteration order; callers must not assume any
    /// particular ordering. An unreadable root or producer directory aborts the
    /// walk; malformed bucket names and non-directory entries are skipped.
    pub fn discover(&self, start: i64, end: i64) -> Result<Vec<CandidateShard>> {
        let window = TimeWindow::new(start, end).widened(self.slack);
        let mut candidates = Vec::new();

        let producers = fs::read_dir(&self.root).map_err(|e| {
            warn!(root = %self.root.display(), error = %e, "failed to list workspace root");
            TracehouseError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read workspace root {}: {}", self.root.display(), e),
            ))
        })?;

        for producer in producers {
            let producer = producer?;
            let producer_path = producer.path();
            if !producer_path.is_dir() {
                continue;
            }

            let buckets = fs::read_dir(&producer_path).map_err(|e| {
                warn!(producer = %producer_path.display(), error = %e, "failed to list producer directory");
                TracehouseError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to read producer directory {}: {}",
                        producer_path.display(),
                        e
                    ),
                ))
            })?;

            for bucket in buckets {
                let bucket = bucket?;
                let bucket_path = bucket.path();
                if !bucket_path.is_dir() {
                    continue;
                }

                let name = match bucket_path.file_name().and_then(|n| n.to_str()) {
                    Some(name) => name,
                    None => continue,
                };

                // Malformed bucket names are skipped, not reported.
                let bucket_start: i64 = match name.parse() {
                    Ok(ts) => ts,
                    Err(_) => continue,
                };

                if !window.intersects_bucket(bucket_start, self.interval) {
                    continue;
                }

                let requires_secondary = !bucket_path.join(SUCCESS_MARKER).is_file();
                candidates.push(CandidateShard {
                    path: bucket_path,
                    requires_secondary,
                });
            }
        }

        debug!(
            start,
            end,
            count = candidates.len(),
            "discovered candidate shards"
        );
        Ok(candidates)
    }
}
