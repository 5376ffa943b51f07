//! Trace reconstruction
//!
//! The assembler turns raw scan output back into trace graphs. Records are
//! parsed as spans (malformed ones are dropped), grouped by trace id, and
//! rebuilt with per-service process identifiers assigned in first-seen order,
//! child-of references for parented spans, and typed log fields for event
//! payloads. Lookup and search both ride the exhaustive fetch mode of the
//! query coordinator: a trace id doubles as a key prefix, and searches first
//! resolve trace ids through the producer's index key space.

use crate::coordinator::QueryCoordinator;
use crate::engine::StorageEngine;
use crate::error::TracehouseError;
use crate::span::{EventValue, SpanRecord};
use crate::trace_model::{KeyValue, Log, Process, Reference, ReferenceType, Span, Trace, ValueType};
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Index key prefix for user-scoped trace lookups
pub const USER_INDEX_PREFIX: &str = "traceuidindex";

/// Index key prefix for time-only trace lookups
pub const TIME_INDEX_PREFIX: &str = "tracetimeindex";

/// Sentinel appended to a prefix to form an exclusive upper bound
///
/// Sorts after every continuation of an ASCII prefix, so the half-open range
/// `[prefix, prefix + MAX_KEY_SUFFIX)` covers all keys starting with `prefix`.
pub const MAX_KEY_SUFFIX: char = '\u{10FFFF}';

/// Divisor from producer span timestamps to UI time units
const UI_TIME_DIVISOR: i64 = 1000;

/// Form the exclusive upper bound for a prefix range scan
pub fn upper_bound(prefix: &str) -> String {
    let mut bound = String::with_capacity(prefix.len() + MAX_KEY_SUFFIX.len_utf8());
    bound.push_str(prefix);
    bound.push(MAX_KEY_SUFFIX);
    bound
}

fn scale_time(t: i64) -> u64 {
    t.max(0) as u64 / UI_TIME_DIVISOR as u64
}

/// Convert one event map into typed UI log fields, in key order
fn event_fields(events: &BTreeMap<String, EventValue>) -> Vec<KeyValue> {
    events
        .iter()
        .map(|(key, value)| {
            let (value_type, value) = match value {
                EventValue::Text(s) => (ValueType::String, serde_json::Value::from(s.clone())),
                EventValue::Bool(b) => (ValueType::Bool, serde_json::Value::from(*b)),
                EventValue::Int(i) => (ValueType::Int64, serde_json::Value::from(*i)),
                EventValue::Uint(u) => (ValueType::Int64, serde_json::Value::from(*u)),
                EventValue::Float(f) => (ValueType::Float64, serde_json::Value::from(*f)),
                EventValue::Opaque(v) => {
                    (ValueType::Binary, serde_json::Value::from(v.to_string()))
                }
            };
            KeyValue {
                key: key.clone(),
                value_type,
                value,
            }
        })
        .collect()
}

struct TraceBuilder {
    trace: Trace,
    service_ids: HashMap<String, String>,
}

/// Group raw span records into UI traces
///
/// Malformed records are dropped. Output traces follow first-seen input order;
/// spans within a trace keep input order. Process identifiers are `p<N>` in
/// first-seen order of distinct service names, so conversion is deterministic
/// for a fixed input order.
pub fn convert(records: &[String]) -> Vec<Trace> {
    let mut builders: HashMap<String, TraceBuilder> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for raw in records {
        let record: SpanRecord = match serde_json::from_str(raw) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "dropping malformed span record");
                continue;
            }
        };

        let builder = builders
            .entry(record.trace_id.clone())
            .or_insert_with(|| {
                order.push(record.trace_id.clone());
                TraceBuilder {
                    trace: Trace::new(record.trace_id.clone()),
                    service_ids: HashMap::new(),
                }
            });

        let process_id = match builder.service_ids.get(&record.lib_name) {
            Some(id) => id.clone(),
            None => {
                let id = format!("p{}", builder.service_ids.len() + 1);
                builder
                    .service_ids
                    .insert(record.lib_name.clone(), id.clone());
                id
            }
        };

        let references = if record.is_root() {
            Vec::new()
        } else {
            vec![Reference {
                ref_type: ReferenceType::ChildOf,
                trace_id: record.trace_id.clone(),
                span_id: record.parent_span_id.clone(),
            }]
        };

        let logs = if record.events.is_empty() {
            Vec::new()
        } else {
            vec![Log {
                timestamp: scale_time(record.begin_time),
                fields: event_fields(&record.events),
            }]
        };

        builder.trace.spans.push(Span {
            trace_id: record.trace_id.clone(),
            span_id: record.span_id.clone(),
            parent_span_id: record.parent_span_id.clone(),
            operation_name: record.name.clone(),
            references,
            start_time: scale_time(record.begin_time),
            duration: scale_time(record.duration()),
            tags: Vec::new(),
            logs,
            process_id,
        });
    }

    order
        .into_iter()
        .filter_map(|trace_id| builders.remove(&trace_id))
        .map(|mut builder| {
            for (service, process_id) in builder.service_ids.drain() {
                builder.trace.processes.insert(
                    process_id,
                    Process {
                        service_name: service,
                        tags: Vec::new(),
                    },
                );
            }
            builder.trace
        })
        .collect()
}

/// Reconstructs traces through a query coordinator
pub struct TraceAssembler<'a, E: StorageEngine> {
    coordinator: &'a QueryCoordinator<E>,
}

impl<'a, E: StorageEngine> TraceAssembler<'a, E> {
    /// Create an assembler over a coordinator
    pub fn new(coordinator: &'a QueryCoordinator<E>) -> Self {
        Self { coordinator }
    }

    /// Fetch and reconstruct one trace by identifier
    pub fn get_trace(&self, trace_id: &str, start: i64, end: i64) -> Result<Vec<Trace>> {
        if trace_id.is_empty() {
            return Err(TracehouseError::invalid_input(
                "trace_id",
                "must not be empty",
                "Pass the trace identifier to look up",
            ));
        }

        let candidates = self.coordinator.discover(start, end)?;
        let records =
            self.coordinator
                .fetch_all("", trace_id, &upper_bound(trace_id), &candidates);
        let traces = convert(&records);

        info!(trace_id, records = records.len(), traces = traces.len(), "trace fetch");
        if traces.is_empty() {
            return Err(TracehouseError::trace_not_found(format!(
                "trace {}",
                trace_id
            )));
        }
        Ok(traces)
    }

    /// Search traces by optional user identity over a time window
    ///
    /// Resolves trace ids through the index key space first, then issues one
    /// direct fetch per resolved id and merges the results.
    pub fn search(&self, user_id: Option<&str>, start: i64, end: i64) -> Result<Vec<Trace>> {
        let candidates = self.coordinator.discover(start, end)?;
        let scale = self.coordinator.config().index_time_scale;
        let (index_start, index_end) = match user_id {
            Some(user) if !user.is_empty() => (
                format!("{}|{}|{}", USER_INDEX_PREFIX, user, start * scale),
                format!("{}|{}|{}", USER_INDEX_PREFIX, user, end * scale),
            ),
            _ => (
                format!("{}|{}", TIME_INDEX_PREFIX, start * scale),
                format!("{}|{}", TIME_INDEX_PREFIX, end * scale),
            ),
        };

        let trace_ids = self
            .coordinator
            .fetch_all("", &index_start, &index_end, &candidates);

        let mut records = Vec::new();
        for trace_id in &trace_ids {
            records.extend(self.coordinator.fetch_all(
                "",
                trace_id,
                &upper_bound(trace_id),
                &candidates,
            ));
        }

        let traces = convert(&records);
        info!(
            resolved = trace_ids.len(),
            traces = traces.len(),
            "trace search"
        );
        if traces.is_empty() {
            return Err(TracehouseError::trace_not_found(match user_id {
                Some(user) if !user.is_empty() => format!("user {}", user),
                _ => format!("window [{}, {}]", start, end),
            }));
        }
        Ok(traces)
    }
}
