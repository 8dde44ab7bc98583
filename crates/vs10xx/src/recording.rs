//! PCM capture options and register values

use platform::SampleRateHz;

use crate::registers::{
    AICTRL3_JOINT_STEREO, AICTRL3_LEFT, AICTRL3_LINEAR_PCM, AICTRL3_RIGHT, HDAT1_MAX_WORDS,
};

/// Full scale of SCI_AICTRL1 (recording gain, 1024 = 1×).
pub const GAIN_FULL_SCALE: u16 = 1024;
/// Full scale of SCI_AICTRL2 (automatic gain ceiling).
pub const AUTOGAIN_FULL_SCALE: u16 = 65_535;
/// Size of the RIFF/WAV header the VS1053 plugin emits first.
pub const WAV_HEADER_BYTES: usize = 44;

/// Capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputSource {
    /// Microphone input
    #[default]
    Microphone,
    /// LINE1 (aux) input
    Aux,
}

/// Settings for [`crate::Vs10xx::begin_input`].
///
/// All setters clamp. After `begin_input` succeeds on a VS1003,
/// [`RecordingOptions::sample_rate`] holds the rate actually achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecordingOptions {
    sample_rate: SampleRateHz,
    channels: u8,
    gain: u16,
    autogain: u16,
    input: InputSource,
    keep_wav_header: bool,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            sample_rate: SampleRateHz::default(),
            channels: 1,
            gain: 0,
            autogain: 0,
            input: InputSource::Microphone,
            keep_wav_header: false,
        }
    }
}

impl RecordingOptions {
    /// 8 kHz mono from the microphone with automatic gain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested (or, after `begin_input`, effective) sample rate.
    pub fn sample_rate(&self) -> SampleRateHz {
        self.sample_rate
    }

    /// Set the sample rate, clamped to 8000–48000 Hz.
    pub fn set_sample_rate(&mut self, hz: u32) {
        self.sample_rate = SampleRateHz::clamped(hz);
    }

    /// 1 (mono) or 2 (stereo).
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Set the channel count, clamped to 1–2.
    pub fn set_channels(&mut self, channels: u8) {
        self.channels = channels.clamp(1, 2);
    }

    /// SCI_AICTRL1 value; 0 selects automatic gain control.
    pub fn gain(&self) -> u16 {
        self.gain
    }

    /// Set the recording gain from 0–100 %.
    pub fn set_gain_percent(&mut self, percent: u8) {
        self.gain = scale_percent(percent, GAIN_FULL_SCALE);
    }

    /// SCI_AICTRL2 value.
    pub fn autogain(&self) -> u16 {
        self.autogain
    }

    /// Set the automatic gain ceiling from 0–100 %.
    pub fn set_autogain_percent(&mut self, percent: u8) {
        self.autogain = scale_percent(percent, AUTOGAIN_FULL_SCALE);
    }

    /// Capture source.
    pub fn input(&self) -> InputSource {
        self.input
    }

    /// Select the capture source.
    pub fn set_input(&mut self, input: InputSource) {
        self.input = input;
    }

    /// Whether the 44-byte WAV header is left in the capture stream (VS1053).
    pub fn keep_wav_header(&self) -> bool {
        self.keep_wav_header
    }

    /// Keep or strip the WAV header.
    pub fn set_keep_wav_header(&mut self, keep: bool) {
        self.keep_wav_header = keep;
    }

    /// SCI_AICTRL3 for the VS1053 plugin: channel selection with linear PCM.
    pub fn aictrl3(&self) -> u16 {
        let channels = if self.channels >= 2 {
            AICTRL3_JOINT_STEREO
        } else {
            match self.input {
                InputSource::Aux => AICTRL3_RIGHT,
                InputSource::Microphone => AICTRL3_LEFT,
            }
        };
        channels | AICTRL3_LINEAR_PCM
    }

    pub(crate) fn set_effective_rate(&mut self, hz: u32) {
        self.sample_rate = SampleRateHz::clamped(hz);
    }
}

fn scale_percent(percent: u8, full_scale: u16) -> u16 {
    let scaled = u32::from(percent.min(100))
        .saturating_mul(u32::from(full_scale))
        .checked_div(100)
        .unwrap_or(0);
    u16::try_from(scaled).unwrap_or(full_scale)
}

/// Capture bytes waiting, from a SCI_HDAT1 word count.
///
/// Counts above the 1024-word FIFO are read glitches and report 0.
pub fn available_bytes(hdat1_words: u16, channel_multiplier: u8) -> usize {
    if hdat1_words > HDAT1_MAX_WORDS {
        return 0;
    }
    usize::from(hdat1_words)
        .saturating_mul(2)
        .saturating_mul(usize::from(channel_multiplier))
}
