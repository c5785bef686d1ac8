//! Histograms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A histogram centroid.
///
/// A centroid is a compressed histogram bucket: a representative value, and the number of samples it stands for.
///
/// Sequences of centroids handed to the encoder are expected to already be compacted, with at most one centroid per
/// unique value. The encoder emits centroids in the order given and does not merge them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    value: f64,
    count: u64,
}

impl Centroid {
    /// Creates a new `Centroid` with the given value and count.
    pub const fn new(value: f64, count: u64) -> Self {
        Self { value, count }
    }

    /// Returns the representative value of the centroid.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the number of samples represented by the centroid.
    pub const fn count(&self) -> u64 {
        self.count
    }
}

impl From<(f64, u64)> for Centroid {
    fn from((value, count): (f64, u64)) -> Self {
        Self::new(value, count)
    }
}

/// Histogram granularity.
///
/// The granularity is the time-bucketing resolution that a histogram is reported at.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramGranularity {
    /// Minute-level buckets.
    Minute,

    /// Hour-level buckets.
    Hour,

    /// Day-level buckets.
    Day,
}

impl HistogramGranularity {
    /// Returns the wire token that prefixes histogram lines at this granularity.
    pub const fn as_wire_token(&self) -> &'static str {
        match self {
            Self::Minute => "!M",
            Self::Hour => "!H",
            Self::Day => "!D",
        }
    }
}

impl fmt::Display for HistogramGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_token())
    }
}
