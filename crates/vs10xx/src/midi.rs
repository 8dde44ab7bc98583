//! Realtime MIDI framing
//!
//! The realtime MIDI plugin reads SDI as 16-bit words and only looks at
//! the low byte, so every MIDI byte travels as `0x00, byte`.
//!
//! Status bytes 0x8n–0xBn and 0xEn carry two data bytes; 0xCn and 0xDn
//! carry one. System messages (0xFn) are sent with both data bytes.

use heapless::Vec;

/// A MIDI message ready for SDI: at most three bytes, padded to six.
pub type MidiFrame = Vec<u8, 6>;

/// Frame a channel message for the realtime MIDI plugin.
pub fn frame(command: u8, data1: u8, data2: u8) -> MidiFrame {
    let mut out = MidiFrame::new();
    let bytes: &[u8] = if data_len(command) == 2 {
        &[0x00, command, 0x00, data1, 0x00, data2]
    } else {
        &[0x00, command, 0x00, data1]
    };
    // Both candidates fit in the six-byte capacity.
    let _ = out.extend_from_slice(bytes);
    out
}

/// Number of data bytes following a status byte.
pub(crate) fn data_len(command: u8) -> usize {
    match command & 0xF0 {
        0xC0 | 0xD0 => 1,
        _ => 2,
    }
}

/// Byte at `pos` of the `[0x00, byte]` expansion of `data` used by the
/// MIDI plugin's sample path.
pub fn padded_byte(data: &[u8], pos: usize) -> u8 {
    if pos % 2 == 0 {
        0x00
    } else {
        data.get(pos / 2).copied().unwrap_or(0x00)
    }
}
