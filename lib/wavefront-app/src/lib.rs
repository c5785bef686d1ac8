//! High-level application primitives.
//!
//! This crate provides common primitives for bootstrapping an application that encodes Wavefront telemetry, such as
//! initializing logging.
#![deny(warnings)]
#![deny(missing_docs)]

pub mod logging;

/// Common imports.
pub mod prelude {
    pub use super::logging::{initialize_logging, LoggingConfiguration};
}
