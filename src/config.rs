//! Configuration for Tracehouse
//!
//! This module provides the configuration system for Tracehouse, including
//! parameter validation and builder pattern implementation. The defaults mirror
//! the producer-side layout: hourly buckets, a ten second clock-skew slack, and
//! a one thousand record budget on both the per-scan page and the aggregate
//! response.

use crate::error::TracehouseError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a Tracehouse query layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracehouseConfig {
    /// Root directory of the shard workspace (`root/<producer>/<bucket>/`)
    pub workspace_root: PathBuf,
    /// Directory under which ephemeral read-replica catalogs are created
    pub scratch_root: PathBuf,
    /// Width of one time bucket in seconds
    pub bucket_interval: i64,
    /// Slack applied to both ends of a query window before bucket matching
    pub window_slack: i64,
    /// Per-shard page bound for the resumable query path
    pub page_limit: i64,
    /// Global result budget for one fan-out request
    pub max_results: usize,
    /// Multiplier from window time units to index key time units
    ///
    /// The producer writes `tracetimeindex|` and `traceuidindex|` keys in its own
    /// time unit; this scale converts the query window into that unit and must be
    /// aligned with the concrete producer deployment.
    pub index_time_scale: i64,
}

impl Default for TracehouseConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("./tracehouse_workspace"),
            scratch_root: std::env::temp_dir(),
            bucket_interval: 3600,
            window_slack: 10,
            page_limit: 1000,
            max_results: 1000,
            index_time_scale: 1000,
        }
    }
}

impl TracehouseConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workspace root directory
    pub fn workspace_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.workspace_root = path.into();
        self
    }

    /// Set the scratch root for read-replica catalogs
    pub fn scratch_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.scratch_root = path.into();
        self
    }

    /// Set the bucket interval in seconds
    pub fn bucket_interval(mut self, seconds: i64) -> Self {
        self.bucket_interval = seconds;
        self
    }

    /// Set the window slack in time units
    pub fn window_slack(mut self, slack: i64) -> Self {
        self.window_slack = slack;
        self
    }

    /// Set the per-shard page bound
    pub fn page_limit(mut self, limit: i64) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the global result budget
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Set the index key time scale
    pub fn index_time_scale(mut self, scale: i64) -> Self {
        self.index_time_scale = scale;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TracehouseError> {
        if self.workspace_root.as_os_str().is_empty() {
            return Err(TracehouseError::config_error(
                "workspace_root",
                "must not be empty",
                "Point workspace_root at the directory containing producer shard directories",
            ));
        }

        if self.scratch_root.as_os_str().is_empty() {
            return Err(TracehouseError::config_error(
                "scratch_root",
                "must not be empty",
                "Point scratch_root at a writable directory for ephemeral replica catalogs",
            ));
        }

        if self.bucket_interval <= 0 {
            return Err(TracehouseError::config_error(
                "bucket_interval",
                format!("{} is not a valid bucket width", self.bucket_interval),
                "Set bucket_interval to the producer's partition width in seconds (typically 3600)",
            ));
        }

        if self.window_slack < 0 {
            return Err(TracehouseError::config_error(
                "window_slack",
                "must not be negative",
                "Set window_slack to 0 or a small positive value to absorb clock skew",
            ));
        }

        if self.page_limit <= 0 {
            return Err(TracehouseError::config_error(
                "page_limit",
                format!("{} would disable bounded scanning", self.page_limit),
                "Set page_limit to a positive per-shard page size (recommended: 1000)",
            ));
        }

        if self.max_results == 0 {
            return Err(TracehouseError::config_error(
                "max_results",
                "must be greater than 0",
                "Set max_results to the aggregate response budget (recommended: 1000)",
            ));
        }

        if self.index_time_scale <= 0 {
            return Err(TracehouseError::config_error(
                "index_time_scale",
                "must be greater than 0",
                "Set index_time_scale to the producer's index time unit multiplier (often 1000)",
            ));
        }

        Ok(())
    }

    /// Build the configuration after validation
    pub fn build(self) -> Result<Self, TracehouseError> {
        self.validate()?;
        Ok(self)
    }
}
