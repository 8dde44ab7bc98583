//! PCM capture readout
//!
//! SCI_HDAT1 holds the number of 16-bit words waiting, SCI_HDAT0 pops the
//! next one. On VS1003 the encoder is mono; stereo callers get each word
//! repeated once per channel.

use embedded_hal::digital::{InputPin, OutputPin};
use platform::{ControlBus, LogSink, Timing};

use crate::chip::Mode;
use crate::driver::Vs10xx;
use crate::error::Error;
use crate::recording::available_bytes;
use crate::registers::Register;

impl<B, CS, DCS, DREQ, T, RST, S> Vs10xx<B, CS, DCS, DREQ, T, RST, S>
where
    B: ControlBus,
    CS: OutputPin,
    DCS: OutputPin,
    DREQ: InputPin,
    T: Timing,
    RST: OutputPin,
    S: LogSink,
{
    /// Capture bytes ready to read; 0 outside [`Mode::Input`].
    pub fn available(&mut self) -> Result<usize, Error<B::Error>> {
        if self.mode != Mode::Input {
            return Ok(0);
        }
        let words = self.read_register(Register::HDat1)?;
        Ok(available_bytes(words, self.channel_multiplier))
    }

    /// Fill `buf` with little-endian 16-bit samples.
    ///
    /// Reads whole sample frames only, never more than [`Vs10xx::available`]
    /// reports and never past the end of `buf`. Returns the number of bytes
    /// written; 0 outside [`Mode::Input`].
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Error<B::Error>> {
        if self.mode != Mode::Input {
            return Ok(0);
        }
        let ready = self.available()?;
        let len = buf.len().min(ready);
        let frame = usize::from(self.channel_multiplier.max(1)).saturating_mul(2);
        let Some(target) = buf.get_mut(..len) else {
            return Ok(0);
        };

        let mut written = 0usize;
        for out in target.chunks_exact_mut(frame) {
            let sample = self.read_register(Register::HDat0)?.to_le_bytes();
            for pair in out.chunks_exact_mut(2) {
                pair.copy_from_slice(&sample);
            }
            written = written.saturating_add(frame);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::Sim;

    #[test]
    fn nothing_available_outside_input_mode() {
        let sim = Sim::vs1053();
        sim.borrow_mut().push_capture(&[1, 2, 3]);
        let mut vs = sim.driver();
        let mut buf = [0u8; 8];
        assert_eq!(vs.available().unwrap(), 0);
        assert_eq!(vs.read_bytes(&mut buf).unwrap(), 0);
        assert_eq!(sim.borrow().bus_calls(), 0);
    }
}
