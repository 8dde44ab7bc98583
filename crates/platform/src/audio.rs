//! Audio codec abstraction

use crate::audio_types::VolumePercent;

/// Playback-side codec trait.
///
/// Blocking by design: the VS10xx control link has a single owner and every
/// call completes before the next is issued. Waiting on the chip happens
/// inside the implementation through [`crate::Timing::yield_now`].
pub trait AudioCodec {
    /// Error type
    type Error: core::fmt::Debug;

    /// Initialize the codec and prepare it for compressed-audio playback
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Prime the decoder for a new stream
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Drain and stop the current stream
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Set volume (0-100)
    fn set_volume(&mut self, volume: VolumePercent) -> Result<(), Self::Error>;

    /// Write encoded audio bytes (MP3, Ogg, WAV, ...)
    fn write_audio(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}
