//! Error types for Tracehouse operations
//!
//! This module defines the error taxonomy used throughout Tracehouse. Request-level
//! failures (unreadable workspace, invalid configuration) surface as errors; per-shard
//! failures never do — they are recorded in the shard's cursor state instead, so a
//! single bad shard cannot abort a federated query.

use thiserror::Error;

/// Main error type for all Tracehouse operations
#[derive(Debug, Error)]
pub enum TracehouseError {
    /// IO operations failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration validation failed
    #[error("Configuration error: {field} - {reason}. {suggestion}")]
    Config {
        field: String,
        reason: String,
        suggestion: String,
    },

    /// Input validation failed
    #[error("Invalid input: {field} - {reason}. {suggestion}")]
    InvalidInput {
        field: String,
        reason: String,
        suggestion: String,
    },

    /// Storage engine open or scan failed
    #[error("Engine error: {operation} on {path}: {reason}")]
    Engine {
        operation: String,
        path: String,
        reason: String,
    },

    /// Stored data could not be interpreted
    #[error("Corrupt shard data: {0}")]
    Corruption(String),

    /// Trace lookup or search produced no traces
    #[error("No traces found for {query}")]
    TraceNotFound { query: String },
}

impl TracehouseError {
    /// Create a configuration error with an actionable suggestion
    pub fn config_error(
        field: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an input validation error with an actionable suggestion
    pub fn invalid_input(
        field: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an engine error for a failed open or scan
    pub fn engine(
        operation: impl Into<String>,
        path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Engine {
            operation: operation.into(),
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Create a not-found error for trace lookups and searches
    pub fn trace_not_found(query: impl Into<String>) -> Self {
        Self::TraceNotFound {
            query: query.into(),
        }
    }
}
