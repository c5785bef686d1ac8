//! Core primitives for encoding Wavefront telemetry: object pooling and the telemetry data model.
#![deny(warnings)]
#![deny(missing_docs)]

pub mod data_model;
pub mod pooling;
