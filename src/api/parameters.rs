//! Parameter structures for Tracehouse API operations
//!
//! Each operation has a dedicated parameter struct with a validation method,
//! so malformed requests are rejected before any shard is touched.

use crate::config::TracehouseConfig;
use crate::error::TracehouseError;
use crate::structures::ShardState;

/// Parameters for opening a shard workspace
#[derive(Debug, Clone)]
pub struct OpenWorkspaceParams {
    /// Configuration the service is opened with
    pub config: TracehouseConfig,
}

impl OpenWorkspaceParams {
    /// Create parameters from a configuration
    pub fn new(config: TracehouseConfig) -> Self {
        Self { config }
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<(), TracehouseError> {
        self.config.validate()
    }
}

/// Parameters for one bounded, resumable federated query
#[derive(Debug, Clone)]
pub struct ExecuteQueryParams {
    /// Opaque filter expression forwarded to the engine
    pub query: String,
    /// Optional user identity restricting the key range
    pub user_id: Option<String>,
    /// Window start, producer time units
    pub start: i64,
    /// Window end, producer time units
    pub end: i64,
    /// Cursor state returned by a previous call, for resumption
    pub shards: Vec<ShardState>,
}

impl ExecuteQueryParams {
    /// Create parameters for a fresh query over a window
    pub fn new(query: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            query: query.into(),
            user_id: None,
            start,
            end,
            shards: Vec::new(),
        }
    }

    /// Restrict the query to one user identity
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach cursor state from a previous response
    pub fn shards(mut self, shards: Vec<ShardState>) -> Self {
        self.shards = shards;
        self
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<(), TracehouseError> {
        if self.end < self.start {
            return Err(TracehouseError::invalid_input(
                "window",
                format!("end {} precedes start {}", self.end, self.start),
                "Pass a window whose end is at or after its start",
            ));
        }
        Ok(())
    }
}

/// Parameters for fetching one trace by identifier
#[derive(Debug, Clone)]
pub struct GetTraceParams {
    /// Identifier of the trace to reconstruct
    pub trace_id: String,
    /// Window start, producer time units
    pub start: i64,
    /// Window end, producer time units
    pub end: i64,
}

impl GetTraceParams {
    /// Create parameters for a trace lookup
    pub fn new(trace_id: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            trace_id: trace_id.into(),
            start,
            end,
        }
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<(), TracehouseError> {
        if self.trace_id.is_empty() {
            return Err(TracehouseError::invalid_input(
                "trace_id",
                "must not be empty",
                "Pass the trace identifier to look up",
            ));
        }
        if self.end < self.start {
            return Err(TracehouseError::invalid_input(
                "window",
                format!("end {} precedes start {}", self.end, self.start),
                "Pass a window whose end is at or after its start",
            ));
        }
        Ok(())
    }
}

/// Parameters for searching traces over a window
#[derive(Debug, Clone)]
pub struct SearchTracesParams {
    /// Optional user identity to search under
    pub user_id: Option<String>,
    /// Window start, producer time units
    pub start: i64,
    /// Window end, producer time units
    pub end: i64,
}

impl SearchTracesParams {
    /// Create parameters for a time-only search
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            user_id: None,
            start,
            end,
        }
    }

    /// Restrict the search to one user identity
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<(), TracehouseError> {
        if self.end < self.start {
            return Err(TracehouseError::invalid_input(
                "window",
                format!("end {} precedes start {}", self.end, self.start),
                "Pass a window whose end is at or after its start",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_workspace_validates_config() {
        let params = OpenWorkspaceParams::new(TracehouseConfig::new());
        assert!(params.validate().is_ok());

        let params = OpenWorkspaceParams::new(TracehouseConfig::new().bucket_interval(0));
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_execute_query_window_ordering() {
        assert!(ExecuteQueryParams::new("", 0, 100).validate().is_ok());
        assert!(ExecuteQueryParams::new("", 100, 100).validate().is_ok());
        assert!(ExecuteQueryParams::new("", 100, 0).validate().is_err());
    }

    #[test]
    fn test_execute_query_builders() {
        let params = ExecuteQueryParams::new("filter", 1, 2)
            .user_id("alice")
            .shards(vec![ShardState::new("/data/10.0.0.1/0")]);
        assert_eq!(params.user_id.as_deref(), Some("alice"));
        assert_eq!(params.shards.len(), 1);
    }

    #[test]
    fn test_get_trace_requires_trace_id() {
        assert!(GetTraceParams::new("T1", 0, 100).validate().is_ok());
        assert!(GetTraceParams::new("", 0, 100).validate().is_err());
        assert!(GetTraceParams::new("T1", 100, 0).validate().is_err());
    }

    #[test]
    fn test_search_traces_window_ordering() {
        assert!(SearchTracesParams::new(0, 100).validate().is_ok());
        assert!(SearchTracesParams::new(100, 0).validate().is_err());
        assert!(SearchTracesParams::new(0, 100)
            .user_id("alice")
            .validate()
            .is_ok());
    }
}
