//! Core operation implementations for the Tracehouse API
//!
//! Each operation implements the `ApiOperation` trait against the shared
//! [`TracehouseContext`], taking a dedicated parameter object and returning
//! a typed result:
//!
//! - [`OpenWorkspace`]: open a shard workspace with a configuration
//! - [`ExecuteQuery`]: run one bounded, resumable federated query
//! - [`GetTrace`]: fetch and reconstruct one trace by identifier
//! - [`SearchTraces`]: search traces by user identity or time window

use crate::api::context::TracehouseContext;
use crate::api::parameters::{
    ExecuteQueryParams, GetTraceParams, OpenWorkspaceParams, SearchTracesParams,
};
use crate::engine::StorageEngine;
use crate::error::TracehouseError;
use crate::structures::{QueryRequest, QueryResponse};
use crate::trace_model::Trace;
use crate::tracehouse::Tracehouse;
use apithing::ApiOperation;
use std::sync::OnceLock;

/// Global shared runtime for executing async operations synchronously
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// Execute an async operation synchronously using a shared runtime
///
/// NOTE: This function cannot be called from within a tokio runtime context
/// as it will cause a "Cannot start a runtime from within a runtime" panic.
/// All API operations are synchronous and should be called from synchronous
/// contexts.
fn execute_sync<F, T>(future: F) -> Result<T, TracehouseError>
where
    F: std::future::Future<Output = Result<T, TracehouseError>>,
{
    let rt = RUNTIME
        .get_or_init(|| tokio::runtime::Runtime::new().expect("Failed to create shared Tokio runtime"));
    rt.block_on(future)
}

/// Open a shard workspace on the context
pub struct OpenWorkspace;

impl<E: StorageEngine> ApiOperation<TracehouseContext<E>, OpenWorkspaceParams> for OpenWorkspace {
    type Output = ();
    type Error = TracehouseError;

    fn execute(
        context: &mut TracehouseContext<E>,
        parameters: &OpenWorkspaceParams,
    ) -> Result<Self::Output, Self::Error> {
        parameters.validate()?;
        context.update_config(parameters.config.clone())?;
        context.initialize()
    }
}

/// Run one bounded, resumable federated query
pub struct ExecuteQuery;

impl<E: StorageEngine> ApiOperation<TracehouseContext<E>, ExecuteQueryParams> for ExecuteQuery {
    type Output = QueryResponse;
    type Error = TracehouseError;

    fn execute(
        context: &mut TracehouseContext<E>,
        parameters: &ExecuteQueryParams,
    ) -> Result<Self::Output, Self::Error> {
        parameters.validate()?;

        let mut request =
            QueryRequest::new(parameters.query.as_str(), parameters.start, parameters.end)
                .shards(parameters.shards.clone());
        if let Some(user) = parameters.user_id.as_deref() {
            request = request.user_id(user);
        }

        let instance = context.instance()?;
        execute_sync(instance.query(request))
    }
}

/// Fetch and reconstruct one trace by identifier
pub struct GetTrace;

impl<E: StorageEngine> ApiOperation<TracehouseContext<E>, GetTraceParams> for GetTrace {
    type Output = Vec<Trace>;
    type Error = TracehouseError;

    fn execute(
        context: &mut TracehouseContext<E>,
        parameters: &GetTraceParams,
    ) -> Result<Self::Output, Self::Error> {
        parameters.validate()?;
        let instance = context.instance()?;
        execute_sync(instance.get_trace(&parameters.trace_id, parameters.start, parameters.end))
    }
}

/// Search traces by user identity or time window
pub struct SearchTraces;

impl<E: StorageEngine> ApiOperation<TracehouseContext<E>, SearchTracesParams> for SearchTraces {
    type Output = Vec<Trace>;
    type Error = TracehouseError;

    fn execute(
        context: &mut TracehouseContext<E>,
        parameters: &SearchTracesParams,
    ) -> Result<Self::Output, Self::Error> {
        parameters.validate()?;
        let instance = context.instance()?;
        execute_sync(instance.search(
            parameters.user_id.as_deref(),
            parameters.start,
            parameters.end,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TracehouseConfig;
    use crate::memory::MemoryEngine;
    use crate::test_utils::{create_bucket, TestEnvironment};
    use serde_json::json;

    fn opened_context(
        env: &TestEnvironment,
        engine: MemoryEngine,
    ) -> TracehouseContext<MemoryEngine> {
        let scratch = env.path().join("scratch");
        std::fs::create_dir_all(&scratch).unwrap();
        let config = TracehouseConfig::new()
            .workspace_root(env.path())
            .scratch_root(scratch);

        let mut context = TracehouseContext::new(engine);
        OpenWorkspace::execute(&mut context, &OpenWorkspaceParams::new(config)).unwrap();
        context
    }

    #[test]
    fn test_query_requires_open_workspace() {
        let mut context = TracehouseContext::new(MemoryEngine::new());
        let err = ExecuteQuery::execute(&mut context, &ExecuteQueryParams::new("", 0, 100));
        assert!(err.is_err());
    }

    #[test]
    fn test_execute_query_operation() {
        let env = TestEnvironment::new("op_execute_query");
        let engine = MemoryEngine::new();
        let path = create_bucket(env.path(), "10.0.0.1", 0, true);
        engine.insert(&path, "k1", "v1");

        let mut context = opened_context(&env, engine);
        let response =
            ExecuteQuery::execute(&mut context, &ExecuteQueryParams::new("", 0, 100)).unwrap();
        assert_eq!(response.total_records(), 1);
    }

    #[test]
    fn test_get_trace_operation() {
        let env = TestEnvironment::new("op_get_trace");
        let engine = MemoryEngine::new();
        let path = create_bucket(env.path(), "10.0.0.1", 0, true);
        engine.insert(
            &path,
            "T1|S1",
            json!({
                "trace_id": "T1",
                "span_id": "S1",
                "begin_time": 1_000_000,
                "end_time": 2_000_000,
                "lib_name": "svc-a",
            })
            .to_string(),
        );

        let mut context = opened_context(&env, engine);
        let traces = GetTrace::execute(&mut context, &GetTraceParams::new("T1", 0, 100)).unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].spans.len(), 1);
    }

    #[test]
    fn test_search_traces_operation_not_found() {
        let env = TestEnvironment::new("op_search_not_found");
        let engine = MemoryEngine::new();
        create_bucket(env.path(), "10.0.0.1", 0, true);

        let mut context = opened_context(&env, engine);
        let err = SearchTraces::execute(&mut context, &SearchTracesParams::new(0, 100));
        assert!(matches!(err, Err(TracehouseError::TraceNotFound { .. })));
    }

    #[test]
    fn test_invalid_parameters_rejected_before_execution() {
        let env = TestEnvironment::new("op_invalid_params");
        let mut context = opened_context(&env, MemoryEngine::new());
        assert!(GetTrace::execute(&mut context, &GetTraceParams::new("", 0, 100)).is_err());
        assert!(
            ExecuteQuery::execute(&mut context, &ExecuteQueryParams::new("", 100, 0)).is_err()
        );
    }
}
