//! Streaming engine (SDI)
//!
//! Payloads go out in chunks of at most [`CHUNK_SIZE`] bytes inside a single
//! data-mode session. DREQ high guarantees room for at least 32 bytes, so it
//! is polled before every chunk rather than once per payload.

use embedded_hal::digital::{InputPin, OutputPin};
use platform::{ControlBus, LogSink, Timing};

use crate::driver::Vs10xx;
use crate::error::Error;
use crate::midi::padded_byte;

/// Largest SDI transfer between two DREQ polls.
pub const CHUNK_SIZE: usize = 32;

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
    /// Send `data` unmodified.
    pub fn send_buffer(&mut self, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.stream(data.len(), |offset, chunk| {
            let end = offset.saturating_add(chunk.len());
            if let Some(src) = data.get(offset..end) {
                chunk.copy_from_slice(src);
            }
        })
    }

    /// Send `len` copies of the end-fill byte.
    pub fn send_fillers(&mut self, len: usize) -> Result<(), Error<B::Error>> {
        let fill = self.end_fill_byte;
        self.stream(len, |_, chunk| chunk.fill(fill))
    }

    /// Send `data` expanded to `[0x00, byte]` pairs.
    pub fn send_padded(&mut self, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.stream(data.len().saturating_mul(2), |offset, chunk| {
            for (i, byte) in chunk.iter_mut().enumerate() {
                *byte = padded_byte(data, offset.saturating_add(i));
            }
        })
    }

    /// Stream `len` bytes produced by `fill(offset, chunk)`.
    fn stream(
        &mut self,
        len: usize,
        mut fill: impl FnMut(usize, &mut [u8]),
    ) -> Result<(), Error<B::Error>> {
        if len == 0 {
            return Ok(());
        }
        self.transport.data_mode_on()?;
        let result = self.stream_chunks(len, &mut fill);
        let closed = self.transport.data_mode_off();
        result?;
        closed
    }

    fn stream_chunks(
        &mut self,
        len: usize,
        fill: &mut impl FnMut(usize, &mut [u8]),
    ) -> Result<(), Error<B::Error>> {
        let mut buf = [0u8; CHUNK_SIZE];
        let mut offset = 0usize;
        while offset < len {
            self.wait_dreq()?;
            let n = len.saturating_sub(offset).min(CHUNK_SIZE);
            let Some(chunk) = buf.get_mut(..n) else {
                break;
            };
            fill(offset, chunk);
            self.transport.bus().write_bytes(chunk).map_err(Error::Bus)?;
            offset = offset.saturating_add(n);
        }
        Ok(())
    }
}
