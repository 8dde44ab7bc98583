//! Host capability layer for the VS10xx codec driver
//!
//! This crate provides the trait-based seams the driver core consumes,
//! enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application code
//!         ↓
//! vs10xx driver (mode state machine, patch loader, streaming)
//!         ↓
//! Platform capabilities (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (embedded-hal SPI bus, GPIO, delay)
//! ```
//!
//! # Capabilities
//!
//! - [`ControlBus`] - Shared serial bus with exclusive transaction bracketing
//! - [`Timing`] - Millisecond delays plus a cooperative yield point
//! - [`LogSink`] / [`Logger`] - Injected diagnostics with a minimum severity
//! - [`AudioCodec`] - Blocking playback seam for application code
//!
//! # Features
//!
//! - `std`: Host mocks ([`mocks`]), `StdTiming` and `MemorySink`
//! - `defmt`: `DefmtSink` and `defmt::Format` derives
//! - `tracing`: `TracingSink`
//!
//! # Example
//!
//! ```no_run
//! use platform::{AudioCodec, VolumePercent};
//!
//! fn fade_in<C: AudioCodec>(codec: &mut C) -> Result<(), C::Error> {
//!     for step in 0..=10u8 {
//!         codec.set_volume(VolumePercent::new(step * 10))?;
//!     }
//!     Ok(())
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer a LogSink over println! in lib code
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio;
pub mod audio_types;
pub mod config;
pub mod log;
pub mod mocks;
pub mod peripheral;
pub mod timing;

pub use audio::AudioCodec;
pub use audio_types::{Balance, OutOfRangeError, SampleRateHz, VolumePercent};
pub use log::{Level, LogSink, Logger, NullSink};
pub use peripheral::{ControlBus, SpiBusTransport};
pub use timing::Timing;

#[cfg(feature = "defmt")]
pub use log::DefmtSink;
#[cfg(feature = "tracing")]
pub use log::TracingSink;
#[cfg(any(test, feature = "std"))]
pub use log::MemorySink;
#[cfg(any(test, feature = "std"))]
pub use timing::StdTiming;
