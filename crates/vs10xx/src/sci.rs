//! Register protocol (SCI)
//!
//! ```text
//! read:   XCS↓  0x03  addr  [0xFF→hi]  [0xFF→lo]  wait DREQ  XCS↑
//! write:  XCS↓  0x02  addr   hi         lo        wait DREQ  XCS↑
//! ```
//!
//! The DREQ wait sits inside the session: the chip is only guaranteed to
//! have consumed the command once DREQ is high again.

use embedded_hal::digital::{InputPin, OutputPin};
use platform::{ControlBus, LogSink, Timing};

use crate::driver::Vs10xx;
use crate::error::Error;
use crate::registers::{Register, SCI_READ, SCI_WRITE};

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
    /// Busy-poll DREQ until it is high, yielding on every poll.
    ///
    /// There is no timeout: a chip that never raises DREQ hangs the caller.
    pub fn wait_dreq(&mut self) -> Result<(), Error<B::Error>> {
        while self.dreq.is_low().map_err(Error::pin)? {
            self.timing.yield_now();
        }
        Ok(())
    }

    /// Whether DREQ is currently high.
    pub fn data_request(&mut self) -> Result<bool, Error<B::Error>> {
        self.dreq.is_high().map_err(Error::pin)
    }

    /// Read one SCI register.
    pub fn read_register(&mut self, reg: Register) -> Result<u16, Error<B::Error>> {
        self.read_register_raw(reg.addr())
    }

    /// Write one SCI register.
    pub fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<B::Error>> {
        self.write_register_raw(reg.addr(), value)
    }

    /// Read the SCI register at a raw address.
    pub fn read_register_raw(&mut self, addr: u8) -> Result<u16, Error<B::Error>> {
        self.transport.control_mode_on()?;
        let result = self.sci_read_frame(addr);
        let closed = self.transport.control_mode_off();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Write the SCI register at a raw address (used by plugin tables).
    pub fn write_register_raw(&mut self, addr: u8, value: u16) -> Result<(), Error<B::Error>> {
        self.transport.control_mode_on()?;
        let result = self.sci_write_frame(addr, value);
        let closed = self.transport.control_mode_off();
        result?;
        closed
    }

    /// Write one word of X/Y/I memory or a peripheral register.
    pub fn wram_write(&mut self, address: u16, data: u16) -> Result<(), Error<B::Error>> {
        self.write_register(Register::WramAddr, address)?;
        self.write_register(Register::Wram, data)
    }

    /// Read one word of X/Y/I memory or a peripheral register.
    pub fn wram_read(&mut self, address: u16) -> Result<u16, Error<B::Error>> {
        self.write_register(Register::WramAddr, address)?;
        self.read_register(Register::Wram)
    }

    fn sci_read_frame(&mut self, addr: u8) -> Result<u16, Error<B::Error>> {
        let bus = self.transport.bus();
        bus.write(SCI_READ).map_err(Error::Bus)?;
        bus.write(addr).map_err(Error::Bus)?;
        let hi = bus.transfer(0xFF).map_err(Error::Bus)?;
        let lo = bus.transfer(0xFF).map_err(Error::Bus)?;
        self.wait_dreq()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn sci_write_frame(&mut self, addr: u8, value: u16) -> Result<(), Error<B::Error>> {
        let bus = self.transport.bus();
        bus.write(SCI_WRITE).map_err(Error::Bus)?;
        bus.write(addr).map_err(Error::Bus)?;
        bus.write16(value).map_err(Error::Bus)?;
        self.wait_dreq()
    }
}

#[cfg(test)]
mod tests {
    use crate::registers::Register;
    use crate::sim::Sim;

    #[test]
    fn write_then_read_round_trips_through_chip() {
        let sim = Sim::vs1053();
        let mut vs = sim.driver();
        vs.write_register(Register::AiCtrl1, 0x0400).unwrap();
        assert_eq!(vs.read_register(Register::AiCtrl1).unwrap(), 0x0400);
        assert_eq!(sim.borrow().writes_to(Register::AiCtrl1), [0x0400]);
    }

    #[test]
    fn read_frame_is_opcode_address_two_fillers() {
        let sim = Sim::vs1053();
        let mut vs = sim.driver();
        vs.read_register(Register::Status).unwrap();
        assert_eq!(sim.borrow().sci_bytes(), [0x03, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn write_frame_is_big_endian() {
        let sim = Sim::vs1053();
        let mut vs = sim.driver();
        vs.write_register(Register::Vol, 0x1234).unwrap();
        assert_eq!(sim.borrow().sci_bytes(), [0x02, 0x0B, 0x12, 0x34]);
    }

    #[test]
    fn every_access_waits_for_dreq_inside_the_session() {
        let sim = Sim::vs1053();
        sim.borrow_mut().set_busy_after_transfer(3);
        let mut vs = sim.driver();
        vs.write_register(Register::Bass, 0x00F6).unwrap();
        let chip = sim.borrow();
        // three busy polls plus the one that sees DREQ high
        assert_eq!(chip.dreq_polls(), 4);
        assert!(!chip.in_transaction());
        drop(chip);
        let parts = vs.release();
        assert_eq!(parts.timing.yield_count(), 3);
    }

    #[test]
    fn wram_access_goes_through_address_register() {
        let sim = Sim::vs1053();
        sim.borrow_mut().set_wram(0x1E06, 0x00AB);
        let mut vs = sim.driver();
        assert_eq!(vs.wram_read(0x1E06).unwrap(), 0x00AB);
        vs.wram_write(0xC017, 3).unwrap();
        assert_eq!(sim.borrow().wram(0xC017), 3);
        assert_eq!(sim.borrow().writes_to(Register::WramAddr), [0x1E06, 0xC017]);
    }
}
