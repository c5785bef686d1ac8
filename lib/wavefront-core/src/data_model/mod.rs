//! Telemetry data model.
//!
//! These types describe the records that can be encoded into the Wavefront wire formats. Metrics need no dedicated
//! type, as a metric point is fully described by its name, value, timestamp, source, and tags.

pub mod event;
pub mod histogram;
pub mod trace;
