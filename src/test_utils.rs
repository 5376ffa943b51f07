//! Test utilities for Tracehouse testing
//!
//! This module provides common helpers for testing Tracehouse components:
//! RAII-based temporary directory management and builders for on-disk shard
//! workspace layouts.

use crate::catalog::SUCCESS_MARKER;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// RAII-based test environment for isolated testing
///
/// TestEnvironment provides each test with its own temporary directory that is
/// automatically cleaned up when the test completes, so tests run in isolation
/// without interfering with each other.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub test_name: String,
}

impl TestEnvironment {
    /// Create a new test environment with the given test name
    ///
    /// # Panics
    /// Panics if unable to create the temporary directory
    pub fn new(test_name: &str) -> Self {
        let temp_dir = TempDir::new()
            .unwrap_or_else(|e| panic!("Failed to create temp dir for test {}: {}", test_name, e));

        Self {
            temp_dir,
            test_name: test_name.to_string(),
        }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get a PathBuf to the temporary directory
    pub fn path_buf(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Get the test name
    pub fn name(&self) -> &str {
        &self.test_name
    }
}

/// Create one `<root>/<producer>/<bucket>` shard directory on disk
///
/// Writes the completion marker file when `with_marker` is set, making the
/// bucket read as fully flushed.
///
/// # Panics
/// Panics if directory or marker creation fails
pub fn create_bucket(root: &Path, producer: &str, bucket_start: i64, with_marker: bool) -> PathBuf {
    let bucket = root.join(producer).join(bucket_start.to_string());
    std::fs::create_dir_all(&bucket)
        .unwrap_or_else(|e| panic!("Failed to create bucket {}: {}", bucket.display(), e));

    if with_marker {
        std::fs::write(bucket.join(SUCCESS_MARKER), b"")
            .unwrap_or_else(|e| panic!("Failed to write marker in {}: {}", bucket.display(), e));
    }

    bucket
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_creates_isolated_directory() {
        let env = TestEnvironment::new("env_isolated");
        assert!(env.path().is_dir());
        assert_eq!(env.name(), "env_isolated");
        assert_eq!(env.path_buf(), env.path().to_path_buf());
    }

    #[test]
    fn test_create_bucket_layout() {
        let env = TestEnvironment::new("bucket_layout");
        let marked = create_bucket(env.path(), "10.0.0.1", 3600, true);
        assert!(marked.ends_with("10.0.0.1/3600"));
        assert!(marked.join(SUCCESS_MARKER).is_file());

        let unmarked = create_bucket(env.path(), "10.0.0.1", 7200, false);
        assert!(unmarked.is_dir());
        assert!(!unmarked.join(SUCCESS_MARKER).exists());
    }
}
