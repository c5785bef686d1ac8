use std::borrow::Borrow;

use snafu::ensure;
use wavefront_core::{
    data_model::histogram::{Centroid, HistogramGranularity},
    pooling::ObjectPool,
};

use super::{
    write_point_tags, write_quoted_identifier, write_source, EmptyDistributionName, EncodeError, NoCentroids,
    NoGranularities,
};
use crate::buf::{LineBuffer, LineBuilder};

/// Encodes a histogram distribution, producing one line per enabled granularity.
///
/// Each line has the form `<granularity>[ timestamp] #count value [#count value ...] "name" source="source"
/// ["key"="value" ...]`, terminated by a newline, where `<granularity>` is one of `!M`, `!H`, or `!D`. Lines are
/// emitted in the iteration order of `granularities`, and centroids are written in the order given. If every
/// granularity is disabled, the result is an empty string.
///
/// # Errors
///
/// If the name is empty, there are no centroids, there are no granularities at all, or any tag has an empty value, an
/// error is returned.
#[allow(clippy::too_many_arguments)]
pub fn histogram_line<P, G, GB, EB, I, K, V>(
    pool: &P, name: &str, centroids: &[Centroid], granularities: G, timestamp: i64, source: &str, tags: I,
    default_source: &str,
) -> Result<String, EncodeError>
where
    P: ObjectPool<Item = LineBuffer>,
    G: IntoIterator<Item = (GB, EB)>,
    GB: Borrow<HistogramGranularity>,
    EB: Borrow<bool>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    ensure!(!name.is_empty(), EmptyDistributionName);
    ensure!(!centroids.is_empty(), NoCentroids);

    let mut granularities = granularities.into_iter().peekable();
    ensure!(granularities.peek().is_some(), NoGranularities);

    // Everything after the granularity token is identical across lines, so build it once.
    let mut suffix = pool.acquire();
    if timestamp != 0 {
        suffix.write_byte(b' ');
        suffix.append_int(timestamp, 10);
    }
    for centroid in centroids {
        suffix.write_string(" #");
        suffix.append_uint(centroid.count());
        suffix.write_byte(b' ');
        suffix.append_float(centroid.value());
    }
    suffix.write_byte(b' ');
    write_quoted_identifier(&mut suffix, name);
    write_source(&mut suffix, source, default_source);
    write_point_tags(&mut suffix, tags, |key| EncodeError::BlankHistogramTagValue { key: key.into() })?;
    suffix.write_byte(b'\n');

    let mut lines = LineBuilder::new();
    for (granularity, enabled) in granularities {
        if *enabled.borrow() {
            let token = granularity.borrow().as_wire_token();
            lines.grow(token.len() + suffix.len());
            lines.write_string(token);
            lines.write_bytes(suffix.as_bytes());
        }
    }

    Ok(lines.into_string())
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use similar_asserts::assert_eq;
    use wavefront_core::pooling::{FixedSizeObjectPool, OnDemandObjectPool};

    use super::*;

    const NO_TAGS: [(&str, &str); 0] = [];

    fn pool() -> OnDemandObjectPool<LineBuffer> {
        OnDemandObjectPool::new("test")
    }

    fn centroids() -> Vec<Centroid> {
        vec![Centroid::new(30.0, 20), Centroid::new(5.1, 10)]
    }

    #[test]
    fn single_granularity() {
        let granularities = [(HistogramGranularity::Minute, true)];
        let tags = [("region", "us-west")];
        let line = histogram_line(
            &pool(),
            "request.latency",
            &centroids(),
            granularities,
            1533529977,
            "appServer1",
            tags,
            "default",
        )
        .unwrap();

        assert_eq!(
            line,
            "!M 1533529977 #20 30 #10 5.1 \"request.latency\" source=\"appServer1\" \"region\"=\"us-west\"\n"
        );
    }

    #[test]
    fn multiple_granularities_in_set_order() {
        let granularities = BTreeMap::from([
            (HistogramGranularity::Day, true),
            (HistogramGranularity::Minute, true),
            (HistogramGranularity::Hour, false),
        ]);
        let lines = histogram_line(&pool(), "h", &centroids(), &granularities, 0, "", NO_TAGS, "host").unwrap();

        assert_eq!(
            lines,
            concat!(
                "!M #20 30 #10 5.1 \"h\" source=\"host\"\n",
                "!D #20 30 #10 5.1 \"h\" source=\"host\"\n",
            )
        );
    }

    #[test]
    fn unordered_granularities() {
        let granularities = HashMap::from([
            (HistogramGranularity::Minute, true),
            (HistogramGranularity::Hour, true),
            (HistogramGranularity::Day, true),
        ]);
        let lines = histogram_line(&pool(), "h", &centroids(), &granularities, 0, "s", NO_TAGS, "d").unwrap();

        let mut lines = lines.lines().collect::<Vec<_>>();
        lines.sort_unstable();
        assert_eq!(
            lines,
            vec![
                "!D #20 30 #10 5.1 \"h\" source=\"s\"",
                "!H #20 30 #10 5.1 \"h\" source=\"s\"",
                "!M #20 30 #10 5.1 \"h\" source=\"s\"",
            ]
        );
    }

    #[test]
    fn name_is_sanitized() {
        let granularities = [(HistogramGranularity::Hour, true)];
        let centroids = [Centroid::new(1.0, 1)];
        let line = histogram_line(&pool(), "Δ\"odd name\"", &centroids, granularities, 0, "s", NO_TAGS, "d").unwrap();
        assert_eq!(line, "!H #1 1 \"Δ-odd-name-\" source=\"s\"\n");
    }

    #[test]
    fn all_disabled_is_empty() {
        let granularities = [(HistogramGranularity::Minute, false), (HistogramGranularity::Day, false)];
        let lines = histogram_line(&pool(), "h", &centroids(), granularities, 0, "s", NO_TAGS, "d").unwrap();
        assert_eq!(lines, "");
    }

    #[test]
    fn empty_name() {
        let granularities = [(HistogramGranularity::Minute, true)];
        let error = histogram_line(&pool(), "", &centroids(), granularities, 0, "s", NO_TAGS, "d").unwrap_err();
        assert_eq!(error.to_string(), "empty distribution name");
    }

    #[test]
    fn no_centroids() {
        let granularities = [(HistogramGranularity::Minute, true)];
        let error = histogram_line(&pool(), "h", &[], granularities, 0, "s", NO_TAGS, "d").unwrap_err();
        assert_eq!(error.to_string(), "distribution should have at least one centroid");
    }

    #[test]
    fn no_granularities() {
        let granularities: [(HistogramGranularity, bool); 0] = [];
        let error = histogram_line(&pool(), "h", &centroids(), granularities, 0, "s", NO_TAGS, "d").unwrap_err();
        assert_eq!(error.to_string(), "histogram granularities cannot be empty");
    }

    #[test]
    fn blank_tag_value() {
        let granularities = [(HistogramGranularity::Minute, true)];
        let tags = [("env", "")];
        let error = histogram_line(&pool(), "h", &centroids(), granularities, 0, "s", tags, "d").unwrap_err();
        assert!(matches!(error, EncodeError::BlankHistogramTagValue { ref key } if key == "env"));
        assert_eq!(error.to_string(), "histogram tag value cannot be blank");
    }
    #[test]
    fn buffer_is_returned_on_error() {
        let pool = FixedSizeObjectPool::<LineBuffer>::with_builder("test", 1, || LineBuilder::with_capacity(32));
        let granularities = [(HistogramGranularity::Minute, true)];

        let tags = [("env", "prod"), ("team", "")];
        let error = histogram_line(&pool, "h", &centroids(), granularities, 0, "s", tags, "d").unwrap_err();
        assert!(matches!(error, EncodeError::BlankHistogramTagValue { ref key } if key == "team"));
        assert_eq!(pool.available(), 1);

        let line = histogram_line(&pool, "h", &centroids(), granularities, 0, "s", NO_TAGS, "d").unwrap();
        assert_eq!(line, "!M #20 30 #10 5.1 \"h\" source=\"s\"\n");
        assert_eq!(pool.available(), 1);
    }
}
