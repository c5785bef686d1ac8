use std::borrow::Borrow;

use serde::Deserialize;
use tracing::debug;
use wavefront_core::{
    data_model::{
        event::Event,
        histogram::{Centroid, HistogramGranularity},
        trace::{Span, SpanLog},
    },
    pooling::{FixedSizeObjectPool, ObjectPool},
};

use super::EncodeError;
use crate::buf::{LineBuffer, LineBuilder};

const FALLBACK_SOURCE: &str = "wavefront-sdk";

const fn default_buffer_pool_size() -> usize {
    64
}

const fn default_buffer_capacity() -> usize {
    1024
}

/// Line encoder configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LineEncoderConfiguration {
    /// Source used for any record that does not specify one.
    ///
    /// Defaults to the hostname of the machine, or `wavefront-sdk` if the hostname cannot be determined.
    #[serde(default)]
    default_source: Option<String>,

    /// Number of buffers to keep pooled.
    ///
    /// Defaults to 64.
    #[serde(default = "default_buffer_pool_size")]
    buffer_pool_size: usize,

    /// Initial capacity of each pooled buffer, in bytes.
    ///
    /// Defaults to 1024.
    #[serde(default = "default_buffer_capacity")]
    buffer_capacity: usize,
}

impl LineEncoderConfiguration {
    /// Sets the default source.
    pub fn with_default_source(mut self, default_source: impl Into<String>) -> Self {
        self.default_source = Some(default_source.into());
        self
    }

    /// Sets the number of buffers to keep pooled.
    pub fn with_buffer_pool_size(mut self, buffer_pool_size: usize) -> Self {
        self.buffer_pool_size = buffer_pool_size;
        self
    }

    /// Sets the initial capacity of each pooled buffer, in bytes.
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    /// Returns the number of buffers to keep pooled.
    pub fn buffer_pool_size(&self) -> usize {
        self.buffer_pool_size
    }

    /// Returns the initial capacity of each pooled buffer, in bytes.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Resolves the default source.
    ///
    /// If no default source was configured, the hostname of the machine is used, and failing that, `wavefront-sdk`.
    pub fn resolve_default_source(&self) -> String {
        if let Some(default_source) = self.default_source.as_ref().filter(|s| !s.is_empty()) {
            return default_source.clone();
        }

        match hostname::get() {
            Ok(hostname) => match hostname.into_string() {
                Ok(hostname) if !hostname.is_empty() => hostname,
                _ => FALLBACK_SOURCE.to_string(),
            },
            Err(e) => {
                debug!(error = %e, "Failed to query hostname. Using fallback default source.");
                FALLBACK_SOURCE.to_string()
            }
        }
    }
}

impl Default for LineEncoderConfiguration {
    fn default() -> Self {
        Self {
            default_source: None,
            buffer_pool_size: default_buffer_pool_size(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

/// A line encoder bound to a buffer pool and a default source.
///
/// `LineEncoder` wraps the free-standing encoder functions, supplying them with its pool and default source. Records
/// that fail to encode are logged at debug level before the error is returned.
#[derive(Clone)]
pub struct LineEncoder<P = FixedSizeObjectPool<LineBuffer>> {
    pool: P,
    default_source: String,
}

impl LineEncoder {
    /// Creates a new `LineEncoder` from the given configuration, backed by a fixed-size buffer pool.
    pub fn from_configuration(config: &LineEncoderConfiguration) -> Self {
        let buffer_capacity = config.buffer_capacity;
        let pool = FixedSizeObjectPool::with_builder("line_buffers", config.buffer_pool_size, move || {
            LineBuilder::with_capacity(buffer_capacity)
        });

        Self::with_pool(pool, config.resolve_default_source())
    }
}

impl<P> LineEncoder<P>
where
    P: ObjectPool<Item = LineBuffer>,
{
    /// Creates a new `LineEncoder` with the given pool and default source.
    pub fn with_pool(pool: P, default_source: impl Into<String>) -> Self {
        Self {
            pool,
            default_source: default_source.into(),
        }
    }

    /// Returns the default source.
    pub fn default_source(&self) -> &str {
        &self.default_source
    }

    /// Encodes a metric point.
    ///
    /// See [`metric_line`][super::metric_line] for details.
    ///
    /// # Errors
    ///
    /// If the metric point is invalid, an error is returned.
    pub fn metric_line<I, K, V>(
        &self, name: &str, value: f64, timestamp: i64, source: &str, tags: I,
    ) -> Result<String, EncodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        super::metric_line(&self.pool, name, value, timestamp, source, tags, &self.default_source)
            .inspect_err(|e| debug!(error = %e, metric_name = name, "Rejected metric point."))
    }

    /// Encodes a histogram distribution.
    ///
    /// See [`histogram_line`][super::histogram_line] for details.
    ///
    /// # Errors
    ///
    /// If the distribution is invalid, an error is returned.
    pub fn histogram_line<G, GB, EB, I, K, V>(
        &self, name: &str, centroids: &[Centroid], granularities: G, timestamp: i64, source: &str, tags: I,
    ) -> Result<String, EncodeError>
    where
        G: IntoIterator<Item = (GB, EB)>,
        GB: Borrow<HistogramGranularity>,
        EB: Borrow<bool>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        super::histogram_line(
            &self.pool,
            name,
            centroids,
            granularities,
            timestamp,
            source,
            tags,
            &self.default_source,
        )
        .inspect_err(|e| debug!(error = %e, distribution_name = name, "Rejected distribution."))
    }

    /// Encodes a span.
    ///
    /// See [`span_line`][super::span_line] for details.
    ///
    /// # Errors
    ///
    /// If the span is invalid, an error is returned.
    pub fn span_line(&self, span: &Span) -> Result<String, EncodeError> {
        super::span_line(&self.pool, span, &self.default_source)
            .inspect_err(|e| debug!(error = %e, span_name = span.name(), "Rejected span."))
    }

    /// Encodes the logs of a span.
    ///
    /// See [`span_log_json`][super::span_log_json] for details.
    ///
    /// # Errors
    ///
    /// If the document cannot be serialized, an error is returned.
    pub fn span_log_json(&self, trace_id: &str, span_id: &str, logs: &[SpanLog]) -> Result<String, EncodeError> {
        super::span_log_json(trace_id, span_id, logs)
            .inspect_err(|e| debug!(error = %e, trace_id, span_id, "Rejected span logs."))
    }

    /// Encodes an event as a proxy line.
    ///
    /// See [`event_line`][super::event_line] for details. Events without a source use the default source.
    ///
    /// # Errors
    ///
    /// If the event is invalid, an error is returned.
    pub fn event_line(&self, event: &Event) -> Result<String, EncodeError> {
        self.with_default_event_source(event, |event| super::event_line(&self.pool, event))
            .inspect_err(|e| debug!(error = %e, event_name = event.name(), "Rejected event."))
    }

    /// Encodes an event as an API document.
    ///
    /// See [`event_json`][super::event_json] for details. Events without a source use the default source.
    ///
    /// # Errors
    ///
    /// If the document cannot be serialized, an error is returned.
    pub fn event_json(&self, event: &Event) -> Result<String, EncodeError> {
        self.with_default_event_source(event, super::event_json)
            .inspect_err(|e| debug!(error = %e, event_name = event.name(), "Rejected event."))
    }

    fn with_default_event_source<F>(&self, event: &Event, encode: F) -> Result<String, EncodeError>
    where
        F: FnOnce(&Event) -> Result<String, EncodeError>,
    {
        if event.source().is_empty() && !self.default_source.is_empty() {
            let event = event.clone().with_source(self.default_source.as_str());
            encode(&event)
        } else {
            encode(event)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use similar_asserts::assert_eq;
    use wavefront_core::pooling::OnDemandObjectPool;

    use super::*;

    const TRACE_ID: &str = "7b3bf470-9456-11e8-9eb6-529269fb1459";
    const SPAN_ID: &str = "0313bafe-9457-11e8-9eb6-529269fb1459";

    fn encoder() -> LineEncoder<OnDemandObjectPool<LineBuffer>> {
        LineEncoder::with_pool(OnDemandObjectPool::new("test"), "localhost")
    }

    #[test]
    fn configuration_defaults() {
        let config: LineEncoderConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(config.default_source, None);
        assert_eq!(config.buffer_pool_size(), 64);
        assert_eq!(config.buffer_capacity(), 1024);

        let resolved = config.resolve_default_source();
        assert!(!resolved.is_empty());
    }

    #[test]
    fn configuration_explicit_source() {
        let config: LineEncoderConfiguration =
            serde_json::from_str(r#"{ "default_source": "collector-1", "buffer_pool_size": 4 }"#).unwrap();
        assert_eq!(config.resolve_default_source(), "collector-1");
        assert_eq!(config.buffer_pool_size(), 4);
        assert_eq!(config.buffer_capacity(), 1024);
    }

    #[test]
    fn from_configuration_uses_fixed_pool() {
        let config = LineEncoderConfiguration::default()
            .with_default_source("proxy-host")
            .with_buffer_pool_size(2)
            .with_buffer_capacity(128);
        let encoder = LineEncoder::from_configuration(&config);
        assert_eq!(encoder.default_source(), "proxy-host");

        let line = encoder
            .metric_line("cpu.usage", 1.5, 0, "", [("k", "v")])
            .unwrap();
        assert_eq!(line, "\"cpu.usage\" 1.5 source=\"proxy-host\" \"k\"=\"v\"\n");
    }

    #[test]
    fn metric_uses_default_source() {
        let tags = HashMap::from([("datacenter", "dc1")]);
        let line = encoder()
            .metric_line("cpu.usage", 42422.0, 1533531013, "", &tags)
            .unwrap();
        assert_eq!(line, "\"cpu.usage\" 42422 1533531013 source=\"localhost\" \"datacenter\"=\"dc1\"\n");
    }

    #[test]
    fn rejected_records_surface_errors() {
        let encoder = encoder();
        let no_tags: [(&str, &str); 0] = [];

        let error = encoder.metric_line("", 1.0, 0, "", no_tags).unwrap_err();
        assert_eq!(error.to_string(), "empty metric name");

        let error = encoder
            .histogram_line("h", &[], [(HistogramGranularity::Minute, true)], 0, "", no_tags)
            .unwrap_err();
        assert_eq!(error.to_string(), "distribution should have at least one centroid");

        let error = encoder.span_line(&Span::new("op", "bad", SPAN_ID)).unwrap_err();
        assert_eq!(error.to_string(), "traceId is not in UUID format");
    }

    #[test]
    fn histogram_and_span() {
        let encoder = encoder();
        let no_tags: [(&str, &str); 0] = [];

        let line = encoder
            .histogram_line(
                "latency",
                &[Centroid::new(1.0, 3)],
                [(HistogramGranularity::Hour, true)],
                0,
                "",
                no_tags,
            )
            .unwrap();
        assert_eq!(line, "!H #3 1 \"latency\" source=\"localhost\"\n");

        let span = Span::new("op", TRACE_ID, SPAN_ID).with_timing(10, 5);
        let line = encoder.span_line(&span).unwrap();
        assert_eq!(
            line,
            format!("\"op\" source=\"localhost\" traceId={} spanId={} 10 5\n", TRACE_ID, SPAN_ID)
        );

        let json = encoder.span_log_json(TRACE_ID, SPAN_ID, &[]).unwrap();
        assert_eq!(json, format!("{{\"traceId\":\"{}\",\"spanId\":\"{}\",\"logs\":[]}}\n", TRACE_ID, SPAN_ID));
    }

    #[test]
    fn events_use_default_source_when_missing() {
        let encoder = encoder();

        let event = Event::new("deploy", 1533531013000, 1533531014000);
        let line = encoder.event_line(&event).unwrap();
        assert_eq!(line, "@Event 1533531013000 1533531014000 \"deploy\" host=\"localhost\"\n");

        let event = event.with_source("web01");
        let json = encoder.event_json(&event).unwrap();
        assert!(json.contains(r#""hosts":["web01"]"#));
    }
}
