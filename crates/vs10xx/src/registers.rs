//! VS1053b / VS1003b register map
//!
//! Source: VLSI Solution VS1053b Datasheet v1.31 §9.6 and VS1003b Datasheet
//! v1.08 §8.7.
//!
//! # Key SCI Constraints
//!
//! ## Frame shape
//! Every SCI access is exactly four bytes with XCS held low: an opcode
//! (`0x02` write, `0x03` read), the register address, then the 16-bit value
//! MSB first. On reads the chip drives SO during the last two bytes.
//!
//! ## DREQ after every access
//! The chip lowers DREQ while it executes an SCI command. Releasing XCS and
//! starting the next frame before DREQ returns high loses the command.
//!
//! ## WRAM auto-increment
//! After `SCI_WRAMADDR` is written, consecutive `SCI_WRAM` accesses advance
//! the address by one word, so multi-word parameters (e.g. `rateTune`) are
//! written with repeated `SCI_WRAM` writes.

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// SCI register file, addresses 0x0–0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Mode control (see the `SM_*` bits)
    Mode = 0x0,
    /// Status; bits \[7:4\] carry the chip version
    Status = 0x1,
    /// Built-in bass/treble control
    Bass = 0x2,
    /// Clock frequency and multiplier
    ClockF = 0x3,
    /// Decode time in whole seconds
    DecodeTime = 0x4,
    /// Sample rate and channel count
    AuData = 0x5,
    /// RAM data
    Wram = 0x6,
    /// RAM address for `Wram` accesses
    WramAddr = 0x7,
    /// Stream header data 0 (capture: next sample word)
    HDat0 = 0x8,
    /// Stream header data 1 (capture: words waiting)
    HDat1 = 0x9,
    /// Start address of application code
    AiAddr = 0xA,
    /// Volume control, left in the high byte
    Vol = 0xB,
    /// Application control register 0
    AiCtrl0 = 0xC,
    /// Application control register 1
    AiCtrl1 = 0xD,
    /// Application control register 2
    AiCtrl2 = 0xE,
    /// Application control register 3
    AiCtrl3 = 0xF,
}

impl Register {
    /// All registers in address order.
    pub const ALL: [Register; 16] = [
        Register::Mode,
        Register::Status,
        Register::Bass,
        Register::ClockF,
        Register::DecodeTime,
        Register::AuData,
        Register::Wram,
        Register::WramAddr,
        Register::HDat0,
        Register::HDat1,
        Register::AiAddr,
        Register::Vol,
        Register::AiCtrl0,
        Register::AiCtrl1,
        Register::AiCtrl2,
        Register::AiCtrl3,
    ];

    /// SCI address of this register.
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Register at `addr`, if it is within 0x0–0xF.
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::ALL.get(usize::from(addr)).copied()
    }
}

// ---------------------------------------------------------------------------
// SCI opcodes
// ---------------------------------------------------------------------------

/// SCI opcode: write register
pub const SCI_WRITE: u8 = 0x02;

/// SCI opcode: read register
pub const SCI_READ: u8 = 0x03;

// ---------------------------------------------------------------------------
// SCI_MODE bits
// ---------------------------------------------------------------------------

/// Software reset (self-clearing)
pub const SM_RESET: u16 = 1 << 2;
/// Cancel decoding current file
pub const SM_CANCEL: u16 = 1 << 3;
/// EarSpeaker low setting
pub const SM_EARSPEAKER_LO: u16 = 1 << 4;
/// Allow SDI tests
pub const SM_TESTS: u16 = 1 << 5;
/// Stream mode
pub const SM_STREAM: u16 = 1 << 6;
/// EarSpeaker high setting
pub const SM_EARSPEAKER_HI: u16 = 1 << 7;
/// VS1002 native SPI modes; must always be set
pub const SM_SDINEW: u16 = 1 << 11;
/// PCM/ADPCM recording active
pub const SM_ADPCM: u16 = 1 << 12;
/// MIC / LINE1 selector (set = LINE1)
pub const SM_LINE1: u16 = 1 << 14;

// ---------------------------------------------------------------------------
// SCI_STATUS fields
// ---------------------------------------------------------------------------

/// Mask of the SS_VER field
pub const STATUS_VERSION_MASK: u16 = 0x00F0;
/// Shift of the SS_VER field
pub const STATUS_VERSION_SHIFT: u16 = 4;

/// SS_VER for VS1003
pub const VERSION_VS1003: u8 = 3;
/// SS_VER for VS1053 and VS8053
pub const VERSION_VS1053: u8 = 4;

// ---------------------------------------------------------------------------
// Register field values
// ---------------------------------------------------------------------------

/// SCI_AUDATA at init: 44100 Hz stereo (bit 0 = stereo)
pub const AUDATA_44K1_STEREO: u16 = 44_101;

/// SCI_CLOCKF at init: multiplier 3.0 (12.288 MHz XTALI → 36.864 MHz CLKI)
pub const CLOCKF_INIT: u16 = 6 << 12;

/// SCI_CLOCKF bits \[10:0\] hold the crystal frequency setting (SC_FREQ)
pub const CLOCKF_FREQ_MASK: u16 = 0x03FF;

/// SCI_AUDATA read back once the realtime MIDI plugin is running
pub const AUDATA_MIDI_ACTIVE: u16 = 0xAC45;

/// SCI_AIADDR entry point of the realtime MIDI plugin on VS1003
pub const AIADDR_MIDI_VS1003: u16 = 0x0030;
/// SCI_AIADDR entry point of the realtime MIDI plugin on VS1053
pub const AIADDR_MIDI_VS1053: u16 = 0x0050;
/// SCI_AIADDR entry point that starts PCM encoding on VS1003
pub const AIADDR_PCM_VS1003: u16 = 0x0030;

/// SCI_AICTRL3 bit 2: linear PCM instead of IMA ADPCM
pub const AICTRL3_LINEAR_PCM: u16 = 1 << 2;
/// SCI_AICTRL3 channel mode: joint stereo
pub const AICTRL3_JOINT_STEREO: u16 = 0;
/// SCI_AICTRL3 channel mode: left channel only
pub const AICTRL3_LEFT: u16 = 2;
/// SCI_AICTRL3 channel mode: right channel only
pub const AICTRL3_RIGHT: u16 = 3;

/// SCI_HDAT1 upper bound in words; larger values are treated as garbage
pub const HDAT1_MAX_WORDS: u16 = 1024;

/// SCI_VOL attenuation for silence, per channel
pub const VOL_SILENT: u8 = 0xFE;

// ---------------------------------------------------------------------------
// WRAM / peripheral addresses
// ---------------------------------------------------------------------------

/// X-memory address of `endFillByte`
pub const WRAM_END_FILL_BYTE: u16 = 0x1E06;
/// X-memory address of `rateTune` (32 bits, low word first)
pub const WRAM_RATE_TUNE: u16 = 0x1E07;
/// X-memory address of `oldClock4KHz`; zero forces a rate recalculation
pub const WRAM_OLD_CLOCK_4KHZ: u16 = 0x5B1C;

/// GPIO direction register
pub const GPIO_DDR: u16 = 0xC017;
/// GPIO input value register
pub const GPIO_IDATA: u16 = 0xC018;
/// GPIO output value register
pub const GPIO_ODATA: u16 = 0xC019;
/// I2S configuration register
pub const I2S_CONFIG: u16 = 0xC040;

/// GPIO4–7 carry the I2S signals
pub const GPIO_I2S_PINS: u16 = 0x00F0;
/// I2S_CONFIG: enable MCLK output and the I2S interface
pub const I2S_CONFIG_ENABLE: u16 = 0x000C;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_addresses_match_datasheet() {
        assert_eq!(Register::Mode.addr(), 0x0);
        assert_eq!(Register::Status.addr(), 0x1);
        assert_eq!(Register::Wram.addr(), 0x6);
        assert_eq!(Register::WramAddr.addr(), 0x7);
        assert_eq!(Register::HDat0.addr(), 0x8);
        assert_eq!(Register::AiAddr.addr(), 0xA);
        assert_eq!(Register::Vol.addr(), 0xB);
        assert_eq!(Register::AiCtrl3.addr(), 0xF);
    }

    #[test]
    fn all_is_in_address_order() {
        for (i, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(usize::from(reg.addr()), i);
            assert_eq!(Register::from_addr(reg.addr()), Some(*reg));
        }
        assert_eq!(Register::from_addr(0x10), None);
    }

    #[test]
    fn earspeaker_bits_are_distinct() {
        assert_eq!(SM_EARSPEAKER_LO & SM_EARSPEAKER_HI, 0);
    }

    #[test]
    fn init_clock_is_multiplier_3x() {
        assert_eq!(CLOCKF_INIT, 0x6000);
    }
}
