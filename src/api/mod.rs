//! API module for Tracehouse using the ApiThing pattern
//!
//! This module provides the foundation for driving Tracehouse through the
//! ApiThing pattern with a single context and parameter objects for each
//! operation.

pub mod context;
pub mod operations;
pub mod parameters;

// Re-export core components for convenience
pub use apithing::ApiOperation;
pub use context::TracehouseContext;
pub use operations::{ExecuteQuery, GetTrace, OpenWorkspace, SearchTraces};
pub use parameters::{
    ExecuteQueryParams, GetTraceParams, OpenWorkspaceParams, SearchTracesParams,
};
