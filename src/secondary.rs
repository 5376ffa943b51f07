//! Read-replica lifecycle management
//!
//! A shard whose bucket lacks the completion marker may still be under active
//! write, so it cannot be opened directly; the engine instead opens it as a
//! secondary instance rooted at an ephemeral scratch catalog. This module owns
//! that lifecycle: unique scratch path generation and a session guard that
//! closes the handle and removes the scratch directory on every exit path.

use crate::engine::{EngineHandle, StorageEngine};
use crate::identifiers::ScratchId;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Generates scratch catalog paths and opens shard sessions
#[derive(Debug, Clone)]
pub struct SecondaryManager {
    scratch_root: PathBuf,
}

impl SecondaryManager {
    /// Create a manager allocating scratch directories under `scratch_root`
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    /// Allocate a unique scratch catalog path
    ///
    /// The path is derived from the current time plus a ULID component so that
    /// concurrent opens never collide. The directory itself is created by the
    /// engine; only cleanup is our responsibility.
    fn allocate_scratch(&self) -> PathBuf {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.scratch_root
            .join(format!("{}-{}", seconds, ScratchId::new()))
    }

    /// Open a shard, through a read-replica when required
    ///
    /// The returned session owns the engine handle and any scratch directory;
    /// both are released when it drops. Open failure cleans up the scratch path
    /// before propagating.
    pub fn open_shard<E: StorageEngine>(
        &self,
        engine: &E,
        primary: &Path,
        requires_secondary: bool,
    ) -> Result<ShardSession<E::Handle>> {
        let scratch = requires_secondary.then(|| self.allocate_scratch());

        match engine.open(primary, scratch.as_deref()) {
            Ok(handle) => {
                debug!(
                    shard = %primary.display(),
                    secondary = requires_secondary,
                    "opened shard"
                );
                Ok(ShardSession { handle, scratch })
            }
            Err(e) => {
                if let Some(path) = &scratch {
                    remove_scratch(path);
                }
                Err(e)
            }
        }
    }
}

/// RAII guard pairing an open engine handle with its scratch directory
///
/// Dropping the session closes the handle and removes the scratch directory,
/// guaranteeing no native handles or replica catalogs leak regardless of how
/// the scan path exits.
pub struct ShardSession<H: EngineHandle> {
    handle: H,
    scratch: Option<PathBuf>,
}

impl<H: EngineHandle> ShardSession<H> {
    /// Mutable access to the engine handle
    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Scratch catalog path, when this session opened a read-replica
    pub fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_deref()
    }
}

impl<H: EngineHandle> Drop for ShardSession<H> {
    fn drop(&mut self) {
        if let Some(path) = self.scratch.take() {
            remove_scratch(&path);
        }
    }
}

fn remove_scratch(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_dir_all(path) {
            warn!(scratch = %path.display(), error = %e, "failed to remove scratch directory");
        }
    }
}
