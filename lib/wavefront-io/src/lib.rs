//! I/O primitives for producing Wavefront wire-format data: buffers, sanitization, and line encoders.
#![deny(warnings)]

pub mod buf;
pub mod sanitize;
pub mod ser;
