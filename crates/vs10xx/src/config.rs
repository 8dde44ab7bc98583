//! Driver configuration
//!
//! # Bus clock ramp
//!
//! After reset the VS10xx runs from XTALI without the clock multiplier, so
//! SCI reads are only reliable up to CLKI/7. Initialization therefore talks
//! to the chip at [`DriverConfig::slow_spi_hz`], programs SCI_CLOCKF for a
//! 3.0× multiplier, then switches to [`DriverConfig::fast_spi_hz`].
//!
//! | Phase          | Clock   | Self-test VOL step |
//! |----------------|---------|--------------------|
//! | After reset    | 200 kHz | 300                |
//! | After CLOCKF   | 4 MHz   | 3                  |
//!
//! # Firmware tables
//!
//! Patch and plugin images are published by VLSI as compressed `.plg`
//! tables. The driver never embeds them; the application hands them in
//! through [`Firmware`].

use platform::Level;

/// One of the five plugin images the driver knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareSlot {
    /// Generic VS1053b bugfix patch set
    Generic,
    /// PCM/WAV recording plugin for VS1003
    PcmVs1003,
    /// PCM/WAV recording plugin for VS1053
    PcmVs1053,
    /// Realtime MIDI plugin for VS1003
    MidiVs1003,
    /// Realtime MIDI plugin for VS1053
    MidiVs1053,
}

/// Patch and plugin tables in the compressed `.plg` word format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Firmware {
    /// Generic VS1053b patches, loaded by `begin_output` when enabled
    pub generic: Option<&'static [u16]>,
    /// VS1003 recording plugin
    pub pcm_vs1003: Option<&'static [u16]>,
    /// VS1053 recording plugin
    pub pcm_vs1053: Option<&'static [u16]>,
    /// VS1003 realtime MIDI plugin
    pub midi_vs1003: Option<&'static [u16]>,
    /// VS1053 realtime MIDI plugin
    pub midi_vs1053: Option<&'static [u16]>,
}

impl Firmware {
    /// No tables at all.
    pub const fn none() -> Self {
        Self {
            generic: None,
            pcm_vs1003: None,
            pcm_vs1053: None,
            midi_vs1003: None,
            midi_vs1053: None,
        }
    }

    /// Table stored in `slot`, if any.
    pub fn get(&self, slot: FirmwareSlot) -> Option<&'static [u16]> {
        match slot {
            FirmwareSlot::Generic => self.generic,
            FirmwareSlot::PcmVs1003 => self.pcm_vs1003,
            FirmwareSlot::PcmVs1053 => self.pcm_vs1053,
            FirmwareSlot::MidiVs1003 => self.midi_vs1003,
            FirmwareSlot::MidiVs1053 => self.midi_vs1053,
        }
    }

    /// Store `table` in `slot`.
    #[must_use]
    pub fn with(mut self, slot: FirmwareSlot, table: &'static [u16]) -> Self {
        let entry = match slot {
            FirmwareSlot::Generic => &mut self.generic,
            FirmwareSlot::PcmVs1003 => &mut self.pcm_vs1003,
            FirmwareSlot::PcmVs1053 => &mut self.pcm_vs1053,
            FirmwareSlot::MidiVs1003 => &mut self.midi_vs1003,
            FirmwareSlot::MidiVs1053 => &mut self.midi_vs1053,
        };
        *entry = Some(table);
        self
    }
}

/// Tunables for [`crate::Vs10xx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Bus clock used right after reset, in Hz.
    pub slow_spi_hz: u32,
    /// Bus clock used once SCI_CLOCKF is programmed, in Hz.
    pub fast_spi_hz: u32,
    /// SCI_VOL increment per self-test iteration at the slow clock.
    pub self_test_step_slow: u16,
    /// SCI_VOL increment per self-test iteration at the fast clock.
    pub self_test_step_fast: u16,
    /// Self-test stops after this many read-back mismatches.
    pub self_test_max_errors: u16,
    /// Crystal frequency (XTALI) in Hz.
    pub xtal_hz: u32,
    /// Apply [`Firmware::generic`] in `begin_output` on VS1053.
    pub load_default_patches: bool,
    /// Minimum severity forwarded to the log sink.
    pub log_level: Level,
    /// Plugin tables.
    pub firmware: Firmware,
}

impl DriverConfig {
    /// Configuration for a VS1053/VS1003 breakout with a 12.288 MHz crystal.
    pub const fn new() -> Self {
        Self {
            slow_spi_hz: 200_000,
            fast_spi_hz: 4_000_000,
            self_test_step_slow: 300,
            self_test_step_fast: 3,
            self_test_max_errors: 20,
            xtal_hz: 12_288_000,
            load_default_patches: true,
            log_level: Level::Warning,
            firmware: Firmware::none(),
        }
    }

    /// Replace the plugin tables.
    #[must_use]
    pub const fn with_firmware(mut self, firmware: Firmware) -> Self {
        self.firmware = firmware;
        self
    }

    /// Replace the minimum log severity.
    #[must_use]
    pub const fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: [u16; 3] = [0x0007, 0x8001, 0x1234];

    #[test]
    fn defaults_match_breakout_board() {
        let cfg = DriverConfig::default();
        assert_eq!(cfg.slow_spi_hz, 200_000);
        assert_eq!(cfg.fast_spi_hz, 4_000_000);
        assert_eq!(cfg.xtal_hz, 12_288_000);
        assert_eq!(cfg.log_level, Level::Warning);
        assert!(cfg.load_default_patches);
        assert_eq!(cfg.firmware, Firmware::none());
    }

    #[test]
    fn fast_self_test_walks_more_values() {
        let cfg = DriverConfig::new();
        assert!(cfg.self_test_step_fast < cfg.self_test_step_slow);
    }

    #[test]
    fn firmware_slots_are_independent() {
        let fw = Firmware::none().with(FirmwareSlot::MidiVs1053, &TABLE);
        assert_eq!(fw.get(FirmwareSlot::MidiVs1053), Some(&TABLE[..]));
        assert_eq!(fw.get(FirmwareSlot::MidiVs1003), None);
        assert_eq!(fw.get(FirmwareSlot::Generic), None);
    }
}
