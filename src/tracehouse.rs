//! Main Tracehouse API implementation
//!
//! This module provides the main Tracehouse trait and implementation that
//! combines shard discovery, federated querying, and trace reconstruction
//! into a high-level read API over a shard workspace.

use crate::assembler::TraceAssembler;
use crate::config::TracehouseConfig;
use crate::coordinator::QueryCoordinator;
use crate::engine::StorageEngine;
use crate::error::TracehouseError;
use crate::structures::{QueryRequest, QueryResponse};
use crate::trace_model::Trace;
use async_trait::async_trait;
use tracing::{debug, info};

/// Main trait for the Tracehouse query service
#[async_trait]
pub trait Tracehouse {
    type Error;

    /// Execute one bounded, resumable federated query
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, Self::Error>;

    /// Fetch and reconstruct one trace by identifier
    async fn get_trace(
        &self,
        trace_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trace>, Self::Error>;

    /// Search traces by optional user identity over a time window
    async fn search(
        &self,
        user_id: Option<&str>,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trace>, Self::Error>;
}

/// Main Tracehouse implementation over a storage engine
pub struct TracehouseImpl<E: StorageEngine> {
    coordinator: QueryCoordinator<E>,
}

impl<E: StorageEngine> TracehouseImpl<E> {
    /// Create a new Tracehouse instance over a validated configuration
    pub fn new(config: TracehouseConfig, engine: E) -> Result<Self, TracehouseError> {
        let coordinator = QueryCoordinator::new(config, engine)?;
        info!(
            workspace = %coordinator.config().workspace_root.display(),
            "tracehouse ready"
        );
        Ok(Self { coordinator })
    }

    /// The active configuration
    pub fn config(&self) -> &TracehouseConfig {
        self.coordinator.config()
    }

    /// The underlying query coordinator
    pub fn coordinator(&self) -> &QueryCoordinator<E> {
        &self.coordinator
    }

    /// Synchronous federated query
    pub fn query_sync(&self, request: &QueryRequest) -> Result<QueryResponse, TracehouseError> {
        debug!(
            user = request.user_id.as_deref().unwrap_or(""),
            start = request.start,
            end = request.end,
            resumed_shards = request.shards.len(),
            "federated query"
        );
        self.coordinator.execute_query(request)
    }

    /// Synchronous trace lookup
    pub fn get_trace_sync(
        &self,
        trace_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trace>, TracehouseError> {
        TraceAssembler::new(&self.coordinator).get_trace(trace_id, start, end)
    }

    /// Synchronous trace search
    pub fn search_sync(
        &self,
        user_id: Option<&str>,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trace>, TracehouseError> {
        TraceAssembler::new(&self.coordinator).search(user_id, start, end)
    }
}

#[async_trait]
impl<E: StorageEngine> Tracehouse for TracehouseImpl<E> {
    type Error = TracehouseError;

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, Self::Error> {
        self.query_sync(&request)
    }

    async fn get_trace(
        &self,
        trace_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trace>, Self::Error> {
        self.get_trace_sync(trace_id, start, end)
    }

    async fn search(
        &self,
        user_id: Option<&str>,
        start: i64,
        end: i64,
    ) -> Result<Vec<Trace>, Self::Error> {
        self.search_sync(user_id, start, end)
    }
}
