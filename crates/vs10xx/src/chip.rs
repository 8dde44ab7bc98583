//! Chip identity and operating mode

use crate::registers::{
    GPIO_I2S_PINS, I2S_CONFIG_ENABLE, SM_EARSPEAKER_HI, SM_EARSPEAKER_LO, STATUS_VERSION_MASK,
    STATUS_VERSION_SHIFT, VERSION_VS1003, VERSION_VS1053,
};

/// Supported chip families, resolved once from SCI_STATUS during init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipFamily {
    /// VS1003: clock solver based capture, no EarSpeaker, no generic patch
    Vs1003,
    /// VS1053 / VS8053: full register set
    Vs1053,
}

impl ChipFamily {
    /// Family for an SS_VER value, `None` for other VS10xx members.
    pub const fn from_version(version: u8) -> Option<Self> {
        match version {
            VERSION_VS1003 => Some(Self::Vs1003),
            VERSION_VS1053 => Some(Self::Vs1053),
            _ => None,
        }
    }

    /// SS_VER value of this family.
    pub const fn version(self) -> u8 {
        match self {
            Self::Vs1003 => VERSION_VS1003,
            Self::Vs1053 => VERSION_VS1053,
        }
    }

    /// Marketing name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vs1003 => "VS1003",
            Self::Vs1053 => "VS1053",
        }
    }
}

/// SS_VER field of a SCI_STATUS word.
///
/// 0 = VS1001, 1 = VS1011, 2 = VS1002, 3 = VS1003, 4 = VS1053/VS8053,
/// 5 = VS1033, 6 = VS1063, 7 = VS1103.
pub const fn status_version(status: u16) -> u8 {
    ((status & STATUS_VERSION_MASK) >> STATUS_VERSION_SHIFT) as u8
}

/// Operating mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Initialized (or not yet) but no mode entered
    #[default]
    NotActive,
    /// Decoding compressed audio from SDI
    Output,
    /// PCM capture through SCI_HDAT0/HDAT1
    Input,
    /// Realtime MIDI plugin running
    Midi,
}

/// EarSpeaker spatial processing level (VS1053 only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EarSpeaker {
    /// Processing off
    #[default]
    Off,
    /// Minimal
    Min,
    /// Normal
    On,
    /// Extreme
    Max,
}

impl EarSpeaker {
    /// Apply this setting to a SCI_MODE value, leaving other bits alone.
    pub const fn apply(self, mode: u16) -> u16 {
        let cleared = mode & !(SM_EARSPEAKER_LO | SM_EARSPEAKER_HI);
        match self {
            Self::Off => cleared,
            Self::Min => cleared | SM_EARSPEAKER_LO,
            Self::On => cleared | SM_EARSPEAKER_HI,
            Self::Max => cleared | SM_EARSPEAKER_LO | SM_EARSPEAKER_HI,
        }
    }
}

/// I2S output sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2sRate {
    /// 192 kHz
    Khz192,
    /// 96 kHz
    Khz96,
    /// 48 kHz
    #[default]
    Khz48,
}

impl I2sRate {
    /// I2S_CONFIG value: MCLK and I2S enabled plus the rate field.
    pub const fn config(self) -> u16 {
        let rate = match self {
            Self::Khz192 => 0x0002,
            Self::Khz96 => 0x0001,
            Self::Khz48 => 0x0000,
        };
        I2S_CONFIG_ENABLE | rate
    }
}

/// GPIO_DDR value with the I2S pins switched to outputs.
pub(crate) const fn ddr_with_i2s(ddr: u16) -> u16 {
    ddr | GPIO_I2S_PINS
}

/// GPIO_DDR value with the I2S pins back to inputs.
pub(crate) const fn ddr_without_i2s(ddr: u16) -> u16 {
    ddr & !GPIO_I2S_PINS
}
