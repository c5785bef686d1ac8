//! Serialization of telemetry data into wire formats.

pub mod line;
