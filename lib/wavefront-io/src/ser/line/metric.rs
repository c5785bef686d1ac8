use snafu::ensure;
use wavefront_core::pooling::ObjectPool;

use super::{write_point_tags, write_quoted_identifier, write_source, EmptyMetricName, EncodeError};
use crate::buf::LineBuffer;

/// Encodes a metric point as a single line.
///
/// The line has the form `"name" value [timestamp] source="source" ["key"="value" ...]`, terminated by a newline. The
/// timestamp, in seconds, is omitted when zero, and `default_source` is used when `source` is empty.
///
/// # Errors
///
/// If the name is empty, or any tag has an empty value, an error is returned.
pub fn metric_line<P, I, K, V>(
    pool: &P, name: &str, value: f64, timestamp: i64, source: &str, tags: I, default_source: &str,
) -> Result<String, EncodeError>
where
    P: ObjectPool<Item = LineBuffer>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    ensure!(!name.is_empty(), EmptyMetricName);

    let mut buf = pool.acquire();
    write_quoted_identifier(&mut buf, name);
    buf.write_byte(b' ');
    buf.append_float(value);
    if timestamp != 0 {
        buf.write_byte(b' ');
        buf.append_int(timestamp, 10);
    }
    write_source(&mut buf, source, default_source);
    write_point_tags(&mut buf, tags, |key| EncodeError::BlankMetricTagValue { key: key.into() })?;
    buf.write_byte(b'\n');

    Ok(buf.to_owned_string())
}
