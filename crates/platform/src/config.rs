//! Driver-wide naming constants
//!
//! Log sinks reference these constants rather than hardcoding values.

/// Name used as the prefix of every log line
pub const DRIVER_NAME: &str = "VS1053";

/// Separator between [`DRIVER_NAME`] and the rest of a log line.
pub const PREFIX_SEPARATOR: &str = " - ";
