//! Fan-out query coordination
//!
//! The coordinator ties discovery, cursor reconciliation, and per-shard
//! pagination into one federated request. Client-supplied cursor state is
//! matched against the freshly discovered candidate set by shard path, so a
//! client can keep calling with the shards it got back and resume exactly
//! where the previous call stopped. Results accumulate per shard under a
//! global budget; once the budget is hit, all later shards are left untouched
//! for the next call.

use crate::catalog::{CandidateShard, ShardCatalog};
use crate::config::TracehouseConfig;
use crate::engine::{StorageEngine, UNBOUNDED_PAGE};
use crate::pagination::{ScanRange, ShardScanner};
use crate::secondary::SecondaryManager;
use crate::structures::{QueryRequest, QueryResponse, ShardData, ShardState};
use crate::Result;
use std::collections::HashMap;
use tracing::{debug, info};

/// HTTP-shaped success code carried in responses
const RESPONSE_OK: u16 = 200;

/// Executes federated queries over the shard workspace
pub struct QueryCoordinator<E: StorageEngine> {
    config: TracehouseConfig,
    engine: E,
    catalog: ShardCatalog,
    secondary: SecondaryManager,
}

impl<E: StorageEngine> QueryCoordinator<E> {
    /// Create a coordinator over a validated configuration and an engine
    pub fn new(config: TracehouseConfig, engine: E) -> Result<Self> {
        config.validate()?;
        let catalog = ShardCatalog::new(&config);
        let secondary = SecondaryManager::new(config.scratch_root.clone());
        Ok(Self {
            config,
            engine,
            catalog,
            secondary,
        })
    }

    /// The coordinator's configuration
    pub fn config(&self) -> &TracehouseConfig {
        &self.config
    }

    /// Discover candidate shards for a window
    pub fn discover(&self, start: i64, end: i64) -> Result<Vec<CandidateShard>> {
        self.catalog.discover(start, end)
    }

    /// Execute one bounded, resumable fan-out request
    pub fn execute_query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let candidates = self.catalog.discover(request.start, request.end)?;
        let mut shards = self.reconcile(&candidates, &request.shards);

        let (start_key, end_key) = self.query_bounds(request);
        let range = ScanRange {
            filter: &request.query,
            start_key: &start_key,
            end_key: &end_key,
        };

        let scanner = ShardScanner::new(&self.engine, &self.secondary);
        let mut data: Vec<Option<ShardData>> = Vec::with_capacity(shards.len());
        data.resize_with(shards.len(), || None);

        let mut total = 0usize;
        for (i, shard) in shards.iter_mut().enumerate() {
            if shard.status.is_terminal() {
                continue;
            }

            // Clamp the page to the remaining budget so the aggregate response
            // can never exceed max_results.
            let remaining = (self.config.max_results - total) as i64;
            let limit = self.config.page_limit.min(remaining);

            let items = scanner.scan_shard(shard, candidates[i].requires_secondary, &range, limit);
            total += items.len();
            data[i] = Some(ShardData { items });

            // Budget check runs after each shard's contribution; shards past
            // this point keep their prior state for the follow-up call.
            if total >= self.config.max_results {
                debug!(total, cap = self.config.max_results, "result budget reached");
                break;
            }
        }

        info!(
            shards = shards.len(),
            records = total,
            "federated query complete"
        );

        Ok(QueryResponse {
            data,
            shards,
            code: RESPONSE_OK,
        })
    }

    /// Fetch every matching record from the given candidates, unbounded
    ///
    /// The exhaustive path used by trace reconstruction: each shard gets a
    /// fresh cursor and a single unbounded scan; failed shards contribute
    /// nothing. Values merge in candidate order.
    pub fn fetch_all(
        &self,
        filter: &str,
        start_key: &str,
        end_key: &str,
        candidates: &[CandidateShard],
    ) -> Vec<String> {
        let scanner = ShardScanner::new(&self.engine, &self.secondary);
        let range = ScanRange {
            filter,
            start_key,
            end_key,
        };

        let mut values = Vec::new();
        for candidate in candidates {
            let mut state = ShardState::new(candidate.path.to_string_lossy().into_owned());
            values.extend(scanner.scan_shard(
                &mut state,
                candidate.requires_secondary,
                &range,
                UNBOUNDED_PAGE,
            ));
        }
        values
    }

    /// Merge client-supplied cursor state into the discovered candidate set
    ///
    /// Known paths carry their cursor forward; unknown paths start fresh. The
    /// output order follows the candidate set.
    fn reconcile(&self, candidates: &[CandidateShard], supplied: &[ShardState]) -> Vec<ShardState> {
        let by_path: HashMap<&str, &ShardState> =
            supplied.iter().map(|s| (s.path.as_str(), s)).collect();

        candidates
            .iter()
            .map(|candidate| {
                let path = candidate.path.to_string_lossy();
                match by_path.get(path.as_ref()) {
                    Some(state) => (*state).clone(),
                    None => ShardState::new(path.into_owned()),
                }
            })
            .collect()
    }

    /// Key bounds for the resumable query path
    ///
    /// With an identity filter the producer keys records as `<user>|<time>`,
    /// so the widened window maps directly onto a key range. Without one the
    /// scan is unbounded and selection is left to the engine filter.
    fn query_bounds(&self, request: &QueryRequest) -> (String, String) {
        match request.user_id.as_deref() {
            Some(user) if !user.is_empty() => (
                format!("{}|{}", user, request.start - self.config.window_slack),
                format!("{}|{}", user, request.end + self.config.window_slack),
            ),
            _ => (String::new(), String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;
    use crate::structures::ShardStatus;
    use crate::test_utils::{create_bucket, TestEnvironment};

    fn coordinator_for(
        env: &TestEnvironment,
        engine: MemoryEngine,
        page_limit: i64,
        max_results: usize,
    ) -> QueryCoordinator<MemoryEngine> {
        let config = TracehouseConfig::new()
            .workspace_root(env.path())
            .scratch_root(env.path().join("scratch"))
            .page_limit(page_limit)
            .max_results(max_results);
        std::fs::create_dir_all(env.path().join("scratch")).unwrap();
        QueryCoordinator::new(config, engine).unwrap()
    }

    fn seed_bucket(env: &TestEnvironment, engine: &MemoryEngine, producer: &str, ts: i64, n: usize) -> String {
        let path = create_bucket(env.path(), producer, ts, true);
        for i in 1..=n {
            engine.insert(&path, format!("k{:03}", i), format!("{}-v{:03}", producer, i));
        }
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_query_returns_all_when_under_budget() {
        let env = TestEnvironment::new("query_under_budget");
        let engine = MemoryEngine::new();
        seed_bucket(&env, &engine, "10.0.0.1", 0, 3);

        let coordinator = coordinator_for(&env, engine, 100, 1000);
        let response = coordinator
            .execute_query(&QueryRequest::new("", 0, 100))
            .unwrap();

        assert_eq!(response.code, 200);
        assert_eq!(response.total_records(), 3);
        assert_eq!(response.shards.len(), 1);
        assert_eq!(response.shards[0].status, ShardStatus::Finished);
        assert!(!response.has_remaining());
    }

    #[test]
    fn test_budget_stops_iteration_and_preserves_later_shards() {
        let env = TestEnvironment::new("budget_stops_iteration");
        let engine = MemoryEngine::new();
        // Two producers, iteration order unspecified; one will absorb the budget.
        seed_bucket(&env, &engine, "10.0.0.1", 0, 5);
        seed_bucket(&env, &engine, "10.0.0.2", 0, 5);

        let coordinator = coordinator_for(&env, engine, 100, 4);
        let response = coordinator
            .execute_query(&QueryRequest::new("", 0, 100))
            .unwrap();

        // The first shard fills the budget of 4, so exactly one shard was
        // scanned and the other kept its fresh state and empty slot.
        assert_eq!(response.total_records(), 4);
        let untouched: Vec<_> = response
            .shards
            .iter()
            .zip(&response.data)
            .filter(|(s, _)| s.status == ShardStatus::NotStarted)
            .collect();
        assert_eq!(untouched.len(), 1);
        assert!(untouched[0].1.is_none());
        assert!(response.has_remaining());
    }

    #[test]
    fn test_resumption_across_calls_yields_no_duplicates() {
        let env = TestEnvironment::new("resumption_across_calls");
        let engine = MemoryEngine::new();
        seed_bucket(&env, &engine, "10.0.0.1", 0, 5);

        let coordinator = coordinator_for(&env, engine, 2, 2);
        let mut request = QueryRequest::new("", 0, 100);
        let mut collected = Vec::new();

        for _ in 0..4 {
            let response = coordinator.execute_query(&request).unwrap();
            for slot in response.data.iter().flatten() {
                collected.extend(slot.items.clone());
            }
            if !response.has_remaining() {
                break;
            }
            request = request.shards(response.shards);
        }

        assert_eq!(
            collected,
            vec![
                "10.0.0.1-v001",
                "10.0.0.1-v002",
                "10.0.0.1-v003",
                "10.0.0.1-v004",
                "10.0.0.1-v005"
            ]
        );
    }

    #[test]
    fn test_finished_shard_passes_through_unchanged() {
        let env = TestEnvironment::new("finished_shard_passthrough");
        let engine = MemoryEngine::new();
        let path = seed_bucket(&env, &engine, "10.0.0.1", 0, 3);
        // If the coordinator ever re-opened this shard it would turn Error.
        engine.fail_open(&path);

        let mut finished = ShardState::new(path);
        finished.status = ShardStatus::Finished;
        finished.has_more = false;

        let coordinator = coordinator_for(&env, engine, 100, 1000);
        let request = QueryRequest::new("", 0, 100).shards(vec![finished.clone()]);
        let response = coordinator.execute_query(&request).unwrap();

        assert_eq!(response.shards, vec![finished]);
        assert_eq!(response.data, vec![None]);
    }

    #[test]
    fn test_open_failure_isolated_to_shard() {
        let env = TestEnvironment::new("open_failure_isolated");
        let engine = MemoryEngine::new();
        let bad = seed_bucket(&env, &engine, "10.0.0.1", 0, 3);
        seed_bucket(&env, &engine, "10.0.0.2", 0, 2);
        engine.fail_open(&bad);

        let coordinator = coordinator_for(&env, engine, 100, 1000);
        let response = coordinator
            .execute_query(&QueryRequest::new("", 0, 100))
            .unwrap();

        assert_eq!(response.code, 200);
        assert_eq!(response.total_records(), 2);
        assert!(response
            .shards
            .iter()
            .any(|s| s.status == ShardStatus::Error));
        assert!(response
            .shards
            .iter()
            .any(|s| s.status == ShardStatus::Finished));
    }

    #[test]
    fn test_user_id_builds_key_bounds() {
        let env = TestEnvironment::new("user_id_key_bounds");
        let engine = MemoryEngine::new();
        // Producer keys use fixed-width epoch seconds, so the lexicographic
        // key range lines up with numeric time order.
        let path = create_bucket(env.path(), "10.0.0.1", 1700000000, true);
        engine.insert(&path, "alice|1700000050", "alice-early");
        engine.insert(&path, "alice|1700000150", "alice-late");
        engine.insert(&path, "bob|1700000060", "bob-any");

        let coordinator = coordinator_for(&env, engine, 100, 1000);
        // Window widens to [1700000030, 1700000100]: only alice|1700000050 is inside.
        let request = QueryRequest::new("", 1700000040, 1700000090).user_id("alice");
        let response = coordinator.execute_query(&request).unwrap();

        let items: Vec<_> = response
            .data
            .iter()
            .flatten()
            .flat_map(|d| d.items.clone())
            .collect();
        assert_eq!(items, vec!["alice-early"]);
    }

    #[test]
    fn test_fetch_all_merges_across_candidates() {
        let env = TestEnvironment::new("fetch_all_merges");
        let engine = MemoryEngine::new();
        seed_bucket(&env, &engine, "10.0.0.1", 0, 2);
        seed_bucket(&env, &engine, "10.0.0.2", 0, 2);

        let coordinator = coordinator_for(&env, engine, 1, 1);
        let candidates = coordinator.discover(0, 100).unwrap();
        // Unbounded mode ignores the tiny configured page limit.
        let values = coordinator.fetch_all("", "", "", &candidates);
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_missing_workspace_aborts_query() {
        let env = TestEnvironment::new("missing_workspace_aborts");
        let config = TracehouseConfig::new()
            .workspace_root(env.path().join("absent"))
            .scratch_root(env.path());
        let coordinator = QueryCoordinator::new(config, MemoryEngine::new()).unwrap();
        assert!(coordinator
            .execute_query(&QueryRequest::new("", 0, 100))
            .is_err());
    }
}
