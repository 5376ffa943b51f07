//! Tracehouse - a federated query layer over time-partitioned trace shards
//!
//! Tracehouse reads the shard workspaces that trace producers write: one
//! directory per producer, one time bucket per directory, each bucket holding
//! an embedded key/value catalog of span records. Queries fan out across all
//! matching shards with per-shard resumable cursors and a global result
//! budget, and traces come back reassembled in the UI's JSON model.

pub mod api;
pub mod assembler;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod identifiers;
pub mod memory;
pub mod pagination;
pub mod secondary;
pub mod span;
pub mod structures;
pub mod trace_model;
pub mod tracehouse;

#[cfg(test)]
pub mod test_utils;

pub use assembler::{convert, upper_bound, TraceAssembler};
pub use catalog::{CandidateShard, ShardCatalog, TimeWindow, SUCCESS_MARKER};
pub use config::TracehouseConfig;
pub use coordinator::QueryCoordinator;
pub use engine::{EngineHandle, StorageEngine, UNBOUNDED_PAGE};
pub use error::TracehouseError;
pub use identifiers::ScratchId;
pub use memory::MemoryEngine;
pub use pagination::{ScanRange, ShardScanner};
pub use secondary::{SecondaryManager, ShardSession};
pub use span::{EventValue, SpanKind, SpanRecord, SpanStatus, StatusCode};
pub use structures::{
    QueryRequest, QueryResponse, ScanPage, ShardData, ShardState, ShardStatus,
};
pub use trace_model::{
    KeyValue, Log, Process, Reference, ReferenceType, Span, Trace, ValueType,
};
pub use tracehouse::{Tracehouse, TracehouseImpl};

/// Type alias for Results using TracehouseError
pub type Result<T> = std::result::Result<T, TracehouseError>;
