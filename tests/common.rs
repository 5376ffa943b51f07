//! Common test utilities for integration tests
//!
//! This module provides shared utilities for integration tests that cannot
//! access the main crate's test_utils module.

use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracehouse::{MemoryEngine, TracehouseConfig, SUCCESS_MARKER};

/// Creates a temporary directory for test use with proper error handling
pub fn create_temp_dir_for_test() -> TempDir {
    TempDir::new().expect("Failed to create test temporary directory")
}

/// Create one `<root>/<producer>/<bucket>` shard directory on disk
#[allow(dead_code)]
pub fn create_bucket(root: &Path, producer: &str, bucket_start: i64, with_marker: bool) -> PathBuf {
    let bucket = root.join(producer).join(bucket_start.to_string());
    std::fs::create_dir_all(&bucket).expect("Failed to create bucket directory");
    if with_marker {
        std::fs::write(bucket.join(SUCCESS_MARKER), b"").expect("Failed to write marker");
    }
    bucket
}

/// Configuration rooted at a test workspace, with a scratch directory beside it
#[allow(dead_code)]
pub fn workspace_config(root: &Path) -> TracehouseConfig {
    let scratch = root.join("scratch");
    std::fs::create_dir_all(&scratch).expect("Failed to create scratch directory");
    TracehouseConfig::new()
        .workspace_root(root)
        .scratch_root(scratch)
}

/// One span record in producer JSON form
#[allow(dead_code)]
pub fn span_record(trace_id: &str, span_id: &str, parent: &str, service: &str) -> String {
    json!({
        "primary_key": format!("{}|{}", trace_id, span_id),
        "name": format!("op-{}", span_id),
        "trace_id": trace_id,
        "span_id": span_id,
        "parent_span_id": parent,
        "begin_time": 1_000_000,
        "end_time": 1_500_000,
        "lib_name": service,
    })
    .to_string()
}

/// Store a span record under its trace-prefixed key
#[allow(dead_code)]
pub fn insert_span(
    engine: &MemoryEngine,
    bucket: &Path,
    trace_id: &str,
    span_id: &str,
    parent: &str,
    service: &str,
) {
    engine.insert(
        bucket,
        format!("{}|{}", trace_id, span_id),
        span_record(trace_id, span_id, parent, service),
    );
}
