//! Identifier types for Tracehouse
//!
//! This module provides a type-safe ULID wrapper used to generate unique
//! read-replica scratch directory names. Keeping the identifier as its own type
//! prevents accidental mixing with shard paths or trace ids.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use ulid::Ulid;

/// Type-safe wrapper for scratch directory identifiers
///
/// Each secondary open gets a fresh ScratchId so that concurrent requests can
/// never collide on a replica catalog directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ScratchId(u128);

impl ScratchId {
    /// Generate a new ULID-based scratch identifier
    pub fn new() -> Self {
        Self(Ulid::new().0)
    }

    /// Create a ScratchId from a ULID
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid.0)
    }

    /// Convert to ULID
    pub fn as_ulid(self) -> Ulid {
        Ulid(self.0)
    }

    /// Parse from string (alias for FromStr implementation)
    pub fn parse_str(s: &str) -> Result<Self, ulid::DecodeError> {
        Self::from_str(s)
    }

    /// Get the raw u128 value (mainly for testing)
    pub fn raw(self) -> u128 {
        self.0
    }
}

impl Default for ScratchId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ScratchId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ulid(self.0))
    }
}

impl FromStr for ScratchId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_str(s)?.0))
    }
}

impl From<Ulid> for ScratchId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid.0)
    }
}
