//! Trace output model
//!
//! The shapes in this module mirror the Jaeger UI trace JSON model: camelCase
//! identifiers, `CHILD_OF` reference typing, a process table keyed by
//! synthesized `p<N>` identifiers, and lowercase value-type tags on log
//! fields. This is an external compatibility surface — field names here must
//! not drift from what the UI expects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type tag carried by a typed key/value field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// UTF-8 string value
    #[serde(rename = "string")]
    String,
    /// Boolean value
    #[serde(rename = "bool")]
    Bool,
    /// 64-bit integer value
    #[serde(rename = "int64")]
    Int64,
    /// 64-bit floating-point value
    #[serde(rename = "float64")]
    Float64,
    /// Opaque encoded payload
    #[serde(rename = "binary")]
    Binary,
}

/// One typed key/value field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Field key
    pub key: String,
    /// Value type tag
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Field value in its native JSON representation
    pub value: serde_json::Value,
}

/// Reference type between spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceType {
    /// The referenced span is this span's parent
    #[serde(rename = "CHILD_OF")]
    ChildOf,
    /// The referenced span precedes this span causally
    #[serde(rename = "FOLLOWS_FROM")]
    FollowsFrom,
}

/// A reference from one span to another within a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Kind of relationship
    #[serde(rename = "refType")]
    pub ref_type: ReferenceType,
    /// Trace the referenced span belongs to
    #[serde(rename = "traceID")]
    pub trace_id: String,
    /// Referenced span identifier
    #[serde(rename = "spanID")]
    pub span_id: String,
}

/// One timestamped log entry on a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    /// Log timestamp, UI time units
    pub timestamp: u64,
    /// Typed log fields
    pub fields: Vec<KeyValue>,
}

/// One span in UI form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Owning trace identifier
    #[serde(rename = "traceID")]
    pub trace_id: String,
    /// Span identifier
    #[serde(rename = "spanID")]
    pub span_id: String,
    /// Parent span identifier; empty for roots
    #[serde(rename = "parentSpanID", default, skip_serializing_if = "String::is_empty")]
    pub parent_span_id: String,
    /// Operation name
    #[serde(rename = "operationName")]
    pub operation_name: String,
    /// References to other spans in the same trace
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    /// Start time, UI time units
    #[serde(rename = "startTime")]
    pub start_time: u64,
    /// Duration, UI time units
    pub duration: u64,
    /// Span tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<KeyValue>,
    /// Span logs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<Log>,
    /// Process table key for the emitting service
    #[serde(rename = "processID")]
    pub process_id: String,
}

/// One process table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// Service name
    #[serde(rename = "serviceName")]
    pub service_name: String,
    /// Process-level tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<KeyValue>,
}

/// One reconstructed trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Trace identifier
    #[serde(rename = "traceID")]
    pub trace_id: String,
    /// Spans in input order
    pub spans: Vec<Span>,
    /// Process table keyed by synthesized `p<N>` identifiers
    pub processes: HashMap<String, Process>,
    /// Reconstruction warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Trace {
    /// Create an empty trace shell for the given identifier
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            spans: Vec::new(),
            processes: HashMap::new(),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_serializes_with_ui_field_names() {
        let span = Span {
            trace_id: "T1".to_string(),
            span_id: "S2".to_string(),
            parent_span_id: "S1".to_string(),
            operation_name: "GET /items".to_string(),
            references: vec![Reference {
                ref_type: ReferenceType::ChildOf,
                trace_id: "T1".to_string(),
                span_id: "S1".to_string(),
            }],
            start_time: 1000,
            duration: 500,
            tags: Vec::new(),
            logs: Vec::new(),
            process_id: "p1".to_string(),
        };

        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["traceID"], "T1");
        assert_eq!(json["spanID"], "S2");
        assert_eq!(json["parentSpanID"], "S1");
        assert_eq!(json["operationName"], "GET /items");
        assert_eq!(json["startTime"], 1000);
        assert_eq!(json["processID"], "p1");
        assert_eq!(json["references"][0]["refType"], "CHILD_OF");
    }

    #[test]
    fn test_root_span_omits_parent_and_references() {
        let span = Span {
            trace_id: "T1".to_string(),
            span_id: "S1".to_string(),
            parent_span_id: String::new(),
            operation_name: "root".to_string(),
            references: Vec::new(),
            start_time: 0,
            duration: 1,
            tags: Vec::new(),
            logs: Vec::new(),
            process_id: "p1".to_string(),
        };

        let json = serde_json::to_value(&span).unwrap();
        assert!(json.get("parentSpanID").is_none());
        assert!(json.get("references").is_none());
    }

    #[test]
    fn test_value_type_tags_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&ValueType::Int64).unwrap(),
            "\"int64\""
        );
        assert_eq!(
            serde_json::to_string(&ValueType::Binary).unwrap(),
            "\"binary\""
        );
    }

    #[test]
    fn test_process_table_field_names() {
        let mut trace = Trace::new("T1");
        trace.processes.insert(
            "p1".to_string(),
            Process {
                service_name: "svc-a".to_string(),
                tags: Vec::new(),
            },
        );

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["processes"]["p1"]["serviceName"], "svc-a");
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn test_trace_round_trip() {
        let trace = Trace::new("T9");
        let json = serde_json::to_string(&trace).unwrap();
        let restored: Trace = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, trace);
    }
}
