//! Stored span record model
//!
//! Producers write one JSON document per span into the shard stores. This
//! module models that record format for the read path: identity and parent
//! linkage, begin/end timestamps, status and kind codes, the owning library
//! (service) name, an attribute map, and an event map with heterogeneous
//! payload values.
//!
//! Event payloads are captured as a closed tagged variant at parse time so the
//! trace assembler never inspects dynamic types; anything outside the native
//! scalar set falls through to an opaque JSON value.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Span status code as written by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum StatusCode {
    /// Status was not recorded
    #[default]
    Unset,
    /// The operation completed successfully
    Ok,
    /// The operation failed
    Error,
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        match code {
            1 => StatusCode::Ok,
            2 => StatusCode::Error,
            _ => StatusCode::Unset,
        }
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Unset => 0,
            StatusCode::Ok => 1,
            StatusCode::Error => 2,
        }
    }
}

/// Span kind as written by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SpanKind {
    /// Kind was not recorded
    #[default]
    Unspecified,
    /// Internal operation
    Internal,
    /// Server side of a remote call
    Server,
    /// Client side of a remote call
    Client,
    /// Message producer
    Producer,
    /// Message consumer
    Consumer,
}

impl From<i32> for SpanKind {
    fn from(kind: i32) -> Self {
        match kind {
            1 => SpanKind::Internal,
            2 => SpanKind::Server,
            3 => SpanKind::Client,
            4 => SpanKind::Producer,
            5 => SpanKind::Consumer,
            _ => SpanKind::Unspecified,
        }
    }
}

impl From<SpanKind> for i32 {
    fn from(kind: SpanKind) -> Self {
        match kind {
            SpanKind::Unspecified => 0,
            SpanKind::Internal => 1,
            SpanKind::Server => 2,
            SpanKind::Client => 3,
            SpanKind::Producer => 4,
            SpanKind::Consumer => 5,
        }
    }
}

/// Status code plus optional message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpanStatus {
    /// Outcome code
    #[serde(default)]
    pub code: StatusCode,
    /// Free-form status message
    #[serde(default, rename = "msg")]
    pub message: String,
}

/// One event payload value, typed at ingestion
///
/// Untagged: deserialization picks the first matching native representation;
/// arrays, objects and nulls land in [`EventValue::Opaque`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    /// Boolean payload
    Bool(bool),
    /// Signed integer payload
    Int(i64),
    /// Unsigned integer payload exceeding the signed range
    Uint(u64),
    /// Floating-point payload
    Float(f64),
    /// String payload
    Text(String),
    /// Any other JSON shape, kept verbatim
    Opaque(serde_json::Value),
}

/// One stored span record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Storage key the producer wrote this record under
    #[serde(default)]
    pub primary_key: String,
    /// Operation name
    #[serde(default)]
    pub name: String,
    /// Identifier of the trace this span belongs to
    pub trace_id: String,
    /// Identifier of this span
    pub span_id: String,
    /// Identifier of the parent span; empty for root spans
    #[serde(default)]
    pub parent_span_id: String,
    /// Span start, producer time units
    #[serde(default)]
    pub begin_time: i64,
    /// Span end, producer time units
    #[serde(default)]
    pub end_time: i64,
    /// Outcome status
    #[serde(default)]
    pub status: SpanStatus,
    /// Span kind
    #[serde(default)]
    pub kind: SpanKind,
    /// Name of the library (service) that emitted the span
    #[serde(default)]
    pub lib_name: String,
    /// Whether the producer dropped detail payloads for this span
    #[serde(default, rename = "drop_detail")]
    pub drop_detail: bool,
    /// Attribute map
    #[serde(default, rename = "attr")]
    pub attributes: HashMap<String, String>,
    /// Event map; ordered so downstream field emission is deterministic
    #[serde(default)]
    pub events: BTreeMap<String, EventValue>,
}

impl SpanRecord {
    /// Span duration in producer time units, clamped to zero
    pub fn duration(&self) -> i64 {
        (self.end_time - self.begin_time).max(0)
    }

    /// Whether this span is a trace root
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_empty()
    }
}
