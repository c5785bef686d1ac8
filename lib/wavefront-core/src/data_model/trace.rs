//! Distributed tracing spans.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A span tag.
///
/// Unlike metric tags, span tags are an ordered list and the same key may appear more than once. Both the key and the
/// value must be non-empty for the span to be encodable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpanTag {
    key: String,
    value: String,
}

impl SpanTag {
    /// Creates a new `SpanTag`.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the tag key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the tag value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl<K, V> From<(K, V)> for SpanTag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// A structured log entry attached to a span.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SpanLog {
    /// Timestamp of the log entry, in microseconds since the Unix epoch.
    pub timestamp: i64,

    /// Log fields.
    pub fields: BTreeMap<String, String>,
}

impl SpanLog {
    /// Creates a new, empty `SpanLog` at the given timestamp.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field to the log entry.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// A set of span logs, addressed to the span they belong to.
///
/// This is the document shape expected by the span log intake.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLogs<'a> {
    /// Trace ID of the span.
    pub trace_id: &'a str,

    /// Span ID of the span.
    pub span_id: &'a str,

    /// Log entries, in the order they were recorded.
    pub logs: &'a [SpanLog],
}

/// A single timed operation within a distributed trace.
#[derive(Clone, Debug, Default)]
pub struct Span {
    name: String,
    start_millis: i64,
    duration_millis: i64,
    source: String,
    trace_id: String,
    span_id: String,
    parents: Vec<String>,
    follows_from: Vec<String>,
    tags: Vec<SpanTag>,
    span_logs: Vec<SpanLog>,
}

impl Span {
    /// Creates a new `Span` with the given name, trace ID, and span ID.
    ///
    /// Trace and span IDs are expected to be UUIDs in their canonical, hyphenated form.
    pub fn new(name: impl Into<String>, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            ..Default::default()
        }
    }

    /// Returns the name of the span.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the start time of the span, in milliseconds since the Unix epoch.
    pub fn start_millis(&self) -> i64 {
        self.start_millis
    }

    /// Returns the duration of the span, in milliseconds.
    pub fn duration_millis(&self) -> i64 {
        self.duration_millis
    }

    /// Returns the source of the span.
    ///
    /// An empty source means the encoder's default source is used.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the trace ID of the span.
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Returns the span ID of the span.
    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    /// Returns the IDs of the parent spans.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Returns the IDs of the spans this span follows from.
    pub fn follows_from(&self) -> &[String] {
        &self.follows_from
    }

    /// Returns the tags of the span.
    pub fn tags(&self) -> &[SpanTag] {
        &self.tags
    }

    /// Returns the logs attached to the span.
    pub fn span_logs(&self) -> &[SpanLog] {
        &self.span_logs
    }

    /// Sets the start time and duration of the span, both in milliseconds.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_timing(mut self, start_millis: i64, duration_millis: i64) -> Self {
        self.start_millis = start_millis;
        self.duration_millis = duration_millis;
        self
    }

    /// Sets the source of the span.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the source of the span.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Adds a parent span ID.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Adds the ID of a span that this span follows from.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_follows_from(mut self, follows_from: impl Into<String>) -> Self {
        self.follows_from.push(follows_from.into());
        self
    }

    /// Adds a tag.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(SpanTag::new(key, value));
        self
    }

    /// Adds a tag.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.push(SpanTag::new(key, value));
    }

    /// Attaches a log entry.
    ///
    /// This variant is specifically for use in builder-style APIs.
    pub fn with_span_log(mut self, span_log: SpanLog) -> Self {
        self.span_logs.push(span_log);
        self
    }

    /// Attaches a log entry.
    pub fn add_span_log(&mut self, span_log: SpanLog) {
        self.span_logs.push(span_log);
    }
}
