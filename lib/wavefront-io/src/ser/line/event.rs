use std::collections::BTreeMap;

use serde::Serialize;
use snafu::ResultExt as _;
use wavefront_core::{data_model::event::Event, pooling::ObjectPool};

use super::{EncodeError, Json};
use crate::{
    buf::LineBuffer,
    sanitize::{write_escaped, write_quoted},
};

/// Largest timestamp still interpreted as seconds rather than milliseconds.
const MAX_SECONDS_TIMESTAMP: i64 = 999_999_999_999;

/// Normalizes the start and end times of an event to milliseconds.
///
/// Any time at or below `999_999_999_999` is taken to be in seconds and is converted to milliseconds. If the resulting
/// end time is zero, the event is instantaneous and its end time becomes one millisecond after its start time.
pub fn adjust_start_end_time(start: i64, end: i64) -> (i64, i64) {
    let to_millis = |ts: i64| {
        if ts <= MAX_SECONDS_TIMESTAMP {
            ts.saturating_mul(1000)
        } else {
            ts
        }
    };

    let start = to_millis(start);
    let mut end = to_millis(end);
    if end == 0 {
        end = start.saturating_add(1);
    }

    (start, end)
}

/// Encodes an event as a single line, in the format accepted by a proxy.
///
/// The line has the form `@Event <start> <end> "name" [key="value" ...] [host="source"] [tag="key: value" ...]`,
/// terminated by a newline, where the key/value pairs are the annotations of the event. Times are normalized with
/// [`adjust_start_end_time`]. The name, annotation values, source, and tags are written as quoted string literals, with
/// any special characters escaped.
///
/// # Errors
///
/// Encoding an event does not currently fail, but may in the future as validation is added.
pub fn event_line<P>(pool: &P, event: &Event) -> Result<String, EncodeError>
where
    P: ObjectPool<Item = LineBuffer>,
{
    let (start, end) = adjust_start_end_time(event.start_millis(), event.end_millis());

    let mut buf = pool.acquire();
    buf.write_string("@Event ");
    buf.append_int(start, 10);
    buf.write_byte(b' ');
    buf.append_int(end, 10);
    buf.write_byte(b' ');
    write_quoted(&mut buf, event.name());

    for (key, value) in event.annotations() {
        buf.write_byte(b' ');
        buf.write_string(key);
        buf.write_byte(b'=');
        write_quoted(&mut buf, value);
    }

    if !event.source().is_empty() {
        buf.write_string(" host=");
        write_quoted(&mut buf, event.source());
    }

    for (key, value) in event.tags() {
        buf.write_string(" tag=\"");
        write_escaped(&mut buf, key);
        buf.write_string(": ");
        write_escaped(&mut buf, value);
        buf.write_byte(b'"');
    }

    buf.write_byte(b'\n');

    Ok(buf.to_owned_string())
}

/// An event, in the document shape accepted by the event API.
///
/// Fields are declared in lexicographical order, which is the order they are serialized in. Annotations are sorted by
/// key as well.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventDocument<'a> {
    annotations: BTreeMap<&'a str, &'a str>,
    end_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    hosts: Option<[&'a str; 1]>,
    name: &'a str,
    start_time: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

/// Encodes an event as a JSON document, in the format accepted by the event API.
///
/// The document holds the name, annotations, and normalized start and end times of the event (see
/// [`adjust_start_end_time`]). Tags are included as a list of `"key: value"` strings, and the source as a single-element
/// `hosts` list, when present. Unlike the line encoders, the document is not terminated by a newline.
///
/// # Errors
///
/// If the document cannot be serialized, an error is returned.
pub fn event_json(event: &Event) -> Result<String, EncodeError> {
    let (start_time, end_time) = adjust_start_end_time(event.start_millis(), event.end_millis());
    let hosts = (!event.source().is_empty()).then_some([event.source()]);
    let tags = event
        .tags()
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect();

    let document = EventDocument {
        annotations: event
            .annotations()
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect(),
        end_time,
        hosts,
        name: event.name(),
        start_time,
        tags,
    };

    serde_json::to_string(&document).context(Json)
}
