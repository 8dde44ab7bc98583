//! VS1053 / VS1003 audio codec driver
//!
//! Drives a VLSI VS10xx over its four-wire control link (XCS, XDCS, DREQ,
//! optional XRESET) and a shared serial bus supplied through
//! [`platform::ControlBus`].
//!
//! # Layers
//!
//! ```text
//! Vs10xx (mode state machine: begin_output / begin_input / begin_midi)
//!    │                 │
//!    ▼                 ▼
//! sdi (chunked     patch (plugin table decoder)
//!  streaming)          │
//!    │                 ▼
//!    │              sci (register protocol)
//!    ▼                 ▼
//! transport (XCS/XDCS selection + bus transaction bracketing)
//!    ▼
//! platform::ControlBus
//! ```
//!
//! Pure value codecs live beside the protocol: [`equalizer`] (SCI_BASS),
//! [`volume`] (SCI_VOL), [`clock`] (VS1003 sample-rate solver),
//! [`recording`] (capture options) and [`midi`] (realtime MIDI framing).
//!
//! # Waiting
//!
//! All waiting is a DREQ busy-poll that calls [`platform::Timing::yield_now`]
//! on every iteration. There is no timeout; a chip that never raises DREQ
//! blocks the caller.
//!
//! # Features
//!
//! - `std`: register-level chip simulator in [`sim`]
//! - `defmt`: `defmt::Format` derives and `platform::DefmtSink`
//! - `tracing`: `platform::TracingSink`
//!
//! # Example
//!
//! ```no_run
//! use platform::{ControlBus, Timing, VolumePercent};
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use vs10xx::{Error, Vs10xx};
//!
//! fn play<B, CS, DCS, DREQ, T>(
//!     vs: &mut Vs10xx<B, CS, DCS, DREQ, T>,
//!     mp3: &[u8],
//! ) -> Result<(), Error<B::Error>>
//! where
//!     B: ControlBus,
//!     CS: OutputPin,
//!     DCS: OutputPin,
//!     DREQ: InputPin,
//!     T: Timing,
//! {
//!     vs.begin_output()?;
//!     vs.set_volume(VolumePercent::new(80))?;
//!     vs.write_audio(mp3)?;
//!     vs.stop_song()
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
#![deny(unsafe_code)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::type_complexity)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))]

pub mod chip;
pub mod clock;
pub mod config;
pub mod equalizer;
pub mod error;
pub mod midi;
pub mod patch;
pub mod recording;
pub mod registers;
pub mod transport;
pub mod volume;

mod capture;
mod driver;
mod playback;
mod sci;
mod sdi;

#[cfg(any(test, feature = "std"))]
pub mod sim;

pub use chip::{ChipFamily, EarSpeaker, I2sRate, Mode};
pub use clock::{ClockSolution, ClockSolver};
pub use config::{DriverConfig, Firmware, FirmwareSlot};
pub use driver::{NoPin, Parts, Vs10xx};
pub use equalizer::{Equalizer, EqualizerBand};
pub use error::{Error, PatchError};
pub use patch::{PatchProgram, PatchRecord};
pub use recording::{InputSource, RecordingOptions};
pub use registers::Register;
pub use sdi::CHUNK_SIZE;
