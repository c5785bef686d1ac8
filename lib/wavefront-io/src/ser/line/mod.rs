//! Wavefront line protocol encoders.
//!
//! Each encoder validates its record, writes it into a buffer acquired from the given object pool, and returns an owned
//! copy of the finished line. The buffer goes back to the pool when the encoder returns, whether or not encoding
//! succeeded.

use snafu::Snafu;

use crate::{
    buf::LineBuilder,
    sanitize::{write_sanitized_identifier, write_sanitized_value},
};

mod encoder;
pub use self::encoder::{LineEncoder, LineEncoderConfiguration};

mod event;
pub use self::event::{adjust_start_end_time, event_json, event_line};

mod histogram;
pub use self::histogram::histogram_line;

mod metric;
pub use self::metric::metric_line;

mod span;
pub use self::span::{span_line, span_log_json};

/// Encode error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum EncodeError {
    /// The metric name was empty.
    #[snafu(display("empty metric name"))]
    EmptyMetricName,

    /// A metric point tag had an empty value.
    #[snafu(display("metric point tag value cannot be blank"))]
    BlankMetricTagValue {
        /// Key of the offending tag.
        key: String,
    },

    /// The distribution name was empty.
    #[snafu(display("empty distribution name"))]
    EmptyDistributionName,

    /// The distribution had no centroids.
    #[snafu(display("distribution should have at least one centroid"))]
    NoCentroids,

    /// The distribution had no granularities at all.
    ///
    /// A set of granularities which are all disabled is not an error: it simply produces no output.
    #[snafu(display("histogram granularities cannot be empty"))]
    NoGranularities,

    /// A histogram tag had an empty value.
    #[snafu(display("histogram tag value cannot be blank"))]
    BlankHistogramTagValue {
        /// Key of the offending tag.
        key: String,
    },

    /// The span name was empty.
    #[snafu(display("empty span name"))]
    EmptySpanName,

    /// The trace ID was not a canonical UUID.
    #[snafu(display("traceId is not in UUID format"))]
    InvalidTraceId {
        /// The offending trace ID.
        trace_id: String,
    },

    /// The span ID was not a canonical UUID.
    #[snafu(display("spanId is not in UUID format"))]
    InvalidSpanId {
        /// The offending span ID.
        span_id: String,
    },

    /// A span tag had an empty key or an empty value.
    #[snafu(display("span tag key/value cannot be blank"))]
    BlankSpanTag {
        /// Key of the offending tag, which may itself be empty.
        key: String,
    },

    /// A JSON document could not be serialized.
    #[snafu(display("failed to serialize JSON document: {}", source))]
    Json {
        /// Error from the serializer.
        source: serde_json::Error,
    },
}

/// Writes `s` as a sanitized identifier, wrapped in double quotes.
fn write_quoted_identifier(buf: &mut LineBuilder, s: &str) {
    buf.grow(s.len() + 2);
    buf.write_byte(b'"');
    write_sanitized_identifier(buf, s);
    buf.write_byte(b'"');
}

/// Writes ` source=<value>`.
fn write_source(buf: &mut LineBuilder, source: &str, default_source: &str) {
    let source = if source.is_empty() { default_source } else { source };
    buf.write_string(" source=");
    write_sanitized_value(buf, source);
}

/// Writes each tag as ` "key"=<value>`, stopping at the first tag with an empty value.
fn write_point_tags<I, K, V, F>(buf: &mut LineBuilder, tags: I, on_blank_value: F) -> Result<(), EncodeError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
    F: Fn(&str) -> EncodeError,
{
    for (key, value) in tags {
        let (key, value) = (key.as_ref(), value.as_ref());
        if value.is_empty() {
            return Err(on_blank_value(key));
        }

        buf.write_byte(b' ');
        write_quoted_identifier(buf, key);
        buf.write_byte(b'=');
        write_sanitized_value(buf, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let cases = [
            (EncodeError::EmptyMetricName, "empty metric name"),
            (
                EncodeError::BlankMetricTagValue { key: "env".into() },
                "metric point tag value cannot be blank",
            ),
            (EncodeError::EmptyDistributionName, "empty distribution name"),
            (EncodeError::NoCentroids, "distribution should have at least one centroid"),
            (EncodeError::NoGranularities, "histogram granularities cannot be empty"),
            (
                EncodeError::BlankHistogramTagValue { key: "env".into() },
                "histogram tag value cannot be blank",
            ),
            (EncodeError::EmptySpanName, "empty span name"),
            (
                EncodeError::InvalidTraceId { trace_id: "x".into() },
                "traceId is not in UUID format",
            ),
            (
                EncodeError::InvalidSpanId { span_id: "x".into() },
                "spanId is not in UUID format",
            ),
            (
                EncodeError::BlankSpanTag { key: String::new() },
                "span tag key/value cannot be blank",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn point_tags_stop_at_first_blank_value() {
        let mut buf = LineBuilder::new();
        let tags = [("a", "1"), ("b", ""), ("c", "3")];
        let error = write_point_tags(&mut buf, tags, |key| EncodeError::BlankMetricTagValue { key: key.into() })
            .unwrap_err();

        assert!(matches!(error, EncodeError::BlankMetricTagValue { key } if key == "b"));
        assert_eq!(buf.to_owned_string(), r#" "a"="1""#);
    }

    #[test]
    fn source_falls_back_to_default() {
        let mut buf = LineBuilder::new();
        write_source(&mut buf, "", "fallback");
        write_source(&mut buf, " host ", "fallback");
        assert_eq!(buf.to_owned_string(), r#" source="fallback" source="host""#);
    }
}
