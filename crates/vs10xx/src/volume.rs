//! SCI_VOL mapping
//!
//! SCI_VOL holds one attenuation byte per channel, left in the high byte,
//! in 0.5 dB steps: 0x00 is full volume and 0xFE is silence (0xFF powers
//! the analog drivers down and is never written here).

use platform::{Balance, VolumePercent};

use crate::registers::VOL_SILENT;

/// Attenuation byte for a 0–100 % channel volume.
pub fn attenuation(volume: VolumePercent) -> u8 {
    let silent = u16::from(VOL_SILENT);
    let scaled = u16::from(volume.get())
        .saturating_mul(silent)
        .checked_div(u16::from(VolumePercent::MAX.get()))
        .unwrap_or(0);
    u8::try_from(silent.saturating_sub(scaled)).unwrap_or(VOL_SILENT)
}

/// SCI_VOL word for `volume` with `balance` applied.
pub fn volume_word(volume: VolumePercent, balance: Balance) -> u16 {
    let (left, right) = balance.apply(volume);
    u16::from_be_bytes([attenuation(left), attenuation(right)])
}
