use snafu::{ensure, ResultExt as _};
use wavefront_core::{
    data_model::trace::{Span, SpanLog, SpanLogs},
    pooling::ObjectPool,
};

use super::{
    write_quoted_identifier, write_source, EmptySpanName, EncodeError, InvalidSpanId, InvalidTraceId, Json,
};
use crate::{
    buf::LineBuffer,
    sanitize::{is_uuid_format, write_sanitized_value},
};

const SPAN_LOGS_MARKER: &str = " \"_spanLogs\"=\"true\"";

/// Encodes a span as a single line.
///
/// The line has the form `"name" source="source" traceId=<id> spanId=<id> [parent=<id> ...] [followsFrom=<id> ...]
/// ["_spanLogs"="true"] ["key"="value" ...] <start millis> <duration millis>`, terminated by a newline. The span logs
/// marker is only present when the span has logs attached, which are sent separately (see [`span_log_json`]).
///
/// # Errors
///
/// If the name is empty, the trace or span ID is not a UUID, or any tag has an empty key or value, an error is
/// returned.
pub fn span_line<P>(pool: &P, span: &Span, default_source: &str) -> Result<String, EncodeError>
where
    P: ObjectPool<Item = LineBuffer>,
{
    ensure!(!span.name().is_empty(), EmptySpanName);
    ensure!(
        is_uuid_format(span.trace_id()),
        InvalidTraceId {
            trace_id: span.trace_id()
        }
    );
    ensure!(
        is_uuid_format(span.span_id()),
        InvalidSpanId {
            span_id: span.span_id()
        }
    );

    let mut buf = pool.acquire();
    write_sanitized_value(&mut buf, span.name());
    write_source(&mut buf, span.source(), default_source);
    buf.write_string(" traceId=");
    buf.write_string(span.trace_id());
    buf.write_string(" spanId=");
    buf.write_string(span.span_id());

    for parent in span.parents() {
        buf.write_string(" parent=");
        buf.write_string(parent);
    }

    for follows_from in span.follows_from() {
        buf.write_string(" followsFrom=");
        buf.write_string(follows_from);
    }

    if !span.span_logs().is_empty() {
        buf.write_string(SPAN_LOGS_MARKER);
    }

    for tag in span.tags() {
        if tag.key().is_empty() || tag.value().is_empty() {
            return Err(EncodeError::BlankSpanTag { key: tag.key().into() });
        }

        buf.write_byte(b' ');
        write_quoted_identifier(&mut buf, tag.key());
        buf.write_byte(b'=');
        write_sanitized_value(&mut buf, tag.value());
    }

    buf.write_byte(b' ');
    buf.append_int(span.start_millis(), 10);
    buf.write_byte(b' ');
    buf.append_int(span.duration_millis(), 10);
    buf.write_byte(b'\n');

    Ok(buf.to_owned_string())
}

/// Encodes the logs of a span as a JSON document, terminated by a newline.
///
/// The document has the form `{"traceId":"...","spanId":"...","logs":[{"timestamp":...,"fields":{...}},...]}`, with
/// logs in the order given.
///
/// # Errors
///
/// If the document cannot be serialized, an error is returned.
pub fn span_log_json(trace_id: &str, span_id: &str, logs: &[SpanLog]) -> Result<String, EncodeError> {
    let document = SpanLogs {
        trace_id,
        span_id,
        logs,
    };

    let mut json = serde_json::to_string(&document).context(Json)?;
    json.push('\n');
    Ok(json)
}
