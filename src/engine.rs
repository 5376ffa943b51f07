//! Storage engine contract
//!
//! Tracehouse treats the embedded key-value store as an opaque external
//! capability reached through a narrow open/scan/close seam. An engine opens a
//! shard directory (optionally through a secondary read-replica catalog when
//! the shard may still be under active write) and serves bounded ordered range
//! scans over it. Closing is tied to handle drop so that every open is paired
//! with a release on all control-flow paths.
//!
//! Keys and filter expressions cross the boundary as borrowed string slices;
//! implementations wrapping native libraries should hand the underlying bytes
//! through without copying.

use crate::error::TracehouseError;
use crate::structures::ScanPage;
use std::path::Path;

/// Page limit value requesting an unbounded scan
///
/// Used by the exhaustive-fetch path of trace reconstruction; the resumable
/// query path always passes a small positive bound.
pub const UNBOUNDED_PAGE: i64 = -1;

/// An open, read-only view of one shard
///
/// Dropping the handle closes the underlying store.
pub trait EngineHandle: Send {
    /// Scan a bounded key range
    ///
    /// `filter` is an opaque expression evaluated by the engine against each
    /// record; an empty filter matches everything. `start_key`/`end_key` bound
    /// the range (inclusive lower, exclusive upper; empty means unbounded). A
    /// record whose key equals `start_key` exactly is skipped so that resuming
    /// from a returned `last_key` never duplicates the record that produced it.
    /// `page_limit` caps the number of returned values; [`UNBOUNDED_PAGE`]
    /// removes the cap.
    fn scan(
        &mut self,
        filter: &str,
        start_key: &str,
        end_key: &str,
        page_limit: i64,
    ) -> Result<ScanPage, TracehouseError>;
}

/// Factory for shard handles
pub trait StorageEngine: Send + Sync {
    /// Handle type produced by [`StorageEngine::open`]
    type Handle: EngineHandle;

    /// Open a shard for reading
    ///
    /// `secondary` carries the scratch catalog path for a read-replica open of
    /// a shard that may still be under active write; `None` opens the primary
    /// path directly.
    fn open(
        &self,
        primary: &Path,
        secondary: Option<&Path>,
    ) -> Result<Self::Handle, TracehouseError>;
}
