//! SCI_BASS tone control codec
//!
//! ```text
//!  15..12        11..8         7..4        3..0
//! ST_AMPLITUDE  ST_FREQLIMIT  SB_AMPLITUDE SB_FREQLIMIT
//! treble gain   treble/1 kHz  bass gain    bass/10 Hz
//! ```
//!
//! Amplitudes are given as 0–100 % and scaled to 0–15; frequency limits are
//! given in Hz (0–15000) and divided by the band's step, saturating at 15.

/// Highest accepted frequency limit in Hz.
pub const MAX_FREQ_LIMIT_HZ: u16 = 15_000;
/// Highest accepted amplitude in percent.
pub const MAX_AMPLITUDE: u8 = 100;

/// Hz per ST_FREQLIMIT step.
pub const TREBLE_STEP_HZ: u16 = 1_000;
/// Hz per SB_FREQLIMIT step.
pub const BASS_STEP_HZ: u16 = 10;

/// One band: frequency limit in Hz and amplitude in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EqualizerBand {
    freq_limit_hz: u16,
    amplitude: u8,
}

impl EqualizerBand {
    /// Create a band, clamping both fields into range.
    pub fn new(freq_limit_hz: u16, amplitude: u8) -> Self {
        Self {
            freq_limit_hz: freq_limit_hz.min(MAX_FREQ_LIMIT_HZ),
            amplitude: amplitude.min(MAX_AMPLITUDE),
        }
    }

    /// Frequency limit in Hz.
    pub fn freq_limit_hz(&self) -> u16 {
        self.freq_limit_hz
    }

    /// Amplitude in percent.
    pub fn amplitude(&self) -> u8 {
        self.amplitude
    }

    /// Change the amplitude (clamped to 100).
    pub fn set_amplitude(&mut self, amplitude: u8) {
        self.amplitude = amplitude.min(MAX_AMPLITUDE);
    }

    /// Change the frequency limit (clamped to 15000 Hz).
    pub fn set_freq_limit_hz(&mut self, hz: u16) {
        self.freq_limit_hz = hz.min(MAX_FREQ_LIMIT_HZ);
    }

    /// 4-bit amplitude field.
    pub fn amplitude_nibble(&self) -> u16 {
        // amplitude <= 100, so the product fits in u16
        u16::from(self.amplitude)
            .saturating_mul(15)
            .checked_div(u16::from(MAX_AMPLITUDE))
            .unwrap_or(0)
    }

    /// 4-bit frequency field for a band stepping `step_hz` per unit.
    pub fn freq_nibble(&self, step_hz: u16) -> u16 {
        self.freq_limit_hz.checked_div(step_hz).unwrap_or(0).min(15)
    }
}

/// Bass and treble bands packed into one SCI_BASS word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Equalizer {
    /// Bass enhancer band
    pub bass: EqualizerBand,
    /// Treble control band
    pub treble: EqualizerBand,
}

impl Default for Equalizer {
    /// Both amplitudes off, bass limit 30 Hz, treble limit 15 kHz.
    fn default() -> Self {
        Self {
            bass: EqualizerBand::new(30, 0),
            treble: EqualizerBand::new(MAX_FREQ_LIMIT_HZ, 0),
        }
    }
}

impl Equalizer {
    /// SCI_BASS register word.
    pub fn value(&self) -> u16 {
        (self.treble.amplitude_nibble() << 12)
            | (self.treble.freq_nibble(TREBLE_STEP_HZ) << 8)
            | (self.bass.amplitude_nibble() << 4)
            | self.bass.freq_nibble(BASS_STEP_HZ)
    }
}

/// SCI_BASS word from four raw nibbles, most significant first:
/// treble amplitude, treble limit, bass amplitude, bass limit.
///
/// Bits above the low nibble of each entry are ignored.
pub fn tone_word(nibbles: [u8; 4]) -> u16 {
    nibbles
        .iter()
        .fold(0u16, |acc, &n| (acc << 4) | u16::from(n & 0x0F))
}
