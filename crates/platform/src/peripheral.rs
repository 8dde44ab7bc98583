//! Bus transport abstraction
//!
//! The codec core only needs a small capability set from the shared serial
//! bus: exclusive transaction bracketing, a settable clock and byte/word
//! transfers. [`ControlBus`] is that set; [`SpiBusTransport`] implements it
//! on top of any `embedded_hal::spi::SpiBus`.

use embedded_hal::spi::SpiBus;

/// Shared serial bus as seen by the codec driver.
///
/// Transfers are MSB first, SPI mode 0. `begin_transaction` /
/// `end_transaction` bracket exclusive ownership of the bus and are not
/// reentrant.
pub trait ControlBus {
    /// Error type
    type Error: core::fmt::Debug;

    /// Acquire exclusive use of the bus.
    fn begin_transaction(&mut self) -> Result<(), Self::Error>;

    /// Release the bus.
    fn end_transaction(&mut self) -> Result<(), Self::Error>;

    /// Set the clock used by subsequent transactions.
    fn set_speed(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Clock out one byte, discarding whatever is clocked in.
    fn write(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Clock out one byte and return the byte clocked in.
    fn transfer(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Clock out a 16-bit word, high byte first.
    fn write16(&mut self, word: u16) -> Result<(), Self::Error> {
        let [hi, lo] = word.to_be_bytes();
        self.write(hi)?;
        self.write(lo)
    }

    /// Clock out a run of bytes.
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write(byte)?;
        }
        Ok(())
    }
}

impl<T: ControlBus + ?Sized> ControlBus for &mut T {
    type Error = T::Error;

    fn begin_transaction(&mut self) -> Result<(), Self::Error> {
        (**self).begin_transaction()
    }

    fn end_transaction(&mut self) -> Result<(), Self::Error> {
        (**self).end_transaction()
    }

    fn set_speed(&mut self, hz: u32) -> Result<(), Self::Error> {
        (**self).set_speed(hz)
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write(byte)
    }

    fn transfer(&mut self, byte: u8) -> Result<u8, Self::Error> {
        (**self).transfer(byte)
    }

    fn write16(&mut self, word: u16) -> Result<(), Self::Error> {
        (**self).write16(word)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_bytes(data)
    }
}

/// [`ControlBus`] over an `embedded_hal` SPI bus.
///
/// `embedded_hal::spi::SpiBus` has no notion of clock speed, so the caller
/// supplies a hook that reconfigures the peripheral. The hook receives the
/// bus and the requested frequency in Hz.
///
/// The bus is owned, so transaction bracketing only has to flush on release;
/// chip selects are driven by the codec driver itself.
pub struct SpiBusTransport<B, F> {
    bus: B,
    set_clock: F,
    speed_hz: u32,
}

impl<B, F> SpiBusTransport<B, F>
where
    B: SpiBus<u8>,
    F: FnMut(&mut B, u32) -> Result<(), B::Error>,
{
    /// Wrap `bus`; `set_clock` is called on every [`ControlBus::set_speed`].
    pub fn new(bus: B, set_clock: F) -> Self {
        Self {
            bus,
            set_clock,
            speed_hz: 0,
        }
    }

    /// Last speed requested through [`ControlBus::set_speed`] (0 if none).
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    /// Give the underlying bus back.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B> SpiBusTransport<B, fn(&mut B, u32) -> Result<(), B::Error>>
where
    B: SpiBus<u8>,
{
    /// Wrap a bus whose clock is fixed at construction time.
    ///
    /// Speed requests are remembered but not applied; use this when the
    /// peripheral already runs at or below the slow self-test clock.
    pub fn fixed_clock(bus: B) -> Self {
        fn ignore<B: SpiBus<u8>>(_: &mut B, _: u32) -> Result<(), B::Error> {
            Ok(())
        }
        Self::new(bus, ignore::<B>)
    }
}

impl<B, F> ControlBus for SpiBusTransport<B, F>
where
    B: SpiBus<u8>,
    F: FnMut(&mut B, u32) -> Result<(), B::Error>,
{
    type Error = B::Error;

    fn begin_transaction(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end_transaction(&mut self) -> Result<(), Self::Error> {
        self.bus.flush()
    }

    fn set_speed(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.speed_hz = hz;
        (self.set_clock)(&mut self.bus, hz)
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.bus.write(&[byte])
    }

    fn transfer(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut read = [0u8];
        self.bus.transfer(&mut read, &[byte])?;
        let [value] = read;
        Ok(value)
    }

    fn write16(&mut self, word: u16) -> Result<(), Self::Error> {
        self.bus.write(&word.to_be_bytes())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(data)
    }
}
