//! Transport session: bus ownership plus the XCS/XDCS select lines
//!
//! | Mode    | XCS  | XDCS | Target               |
//! |---------|------|------|----------------------|
//! | idle    | high | high | nothing              |
//! | control | low  | high | SCI register file    |
//! | data    | high | low  | SDI stream buffer    |
//!
//! Every `*_mode_on` acquires the bus transaction and every `*_mode_off`
//! raises both lines and releases it. Opening a second session before the
//! first one is closed is rejected with [`Error::NestedTransaction`].

use embedded_hal::digital::OutputPin;
use platform::ControlBus;

use crate::error::Error;

/// Which select line is currently asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Session {
    /// No transaction open
    Idle,
    /// XCS low, SCI frames
    Control,
    /// XDCS low, SDI bytes
    Data,
}

/// Owns the bus and both select lines.
#[derive(Debug)]
pub struct Transport<B, CS, DCS> {
    bus: B,
    xcs: CS,
    xdcs: DCS,
    session: Session,
}

impl<B, CS, DCS> Transport<B, CS, DCS>
where
    B: ControlBus,
    CS: OutputPin,
    DCS: OutputPin,
{
    /// Take ownership. No pin is touched until [`Transport::deselect`].
    pub fn new(bus: B, xcs: CS, xdcs: DCS) -> Self {
        Self {
            bus,
            xcs,
            xdcs,
            session: Session::Idle,
        }
    }

    /// Currently open session.
    pub fn session(&self) -> Session {
        self.session
    }

    /// Raw bus access inside an open session.
    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Drive both select lines high without touching the bus.
    pub fn deselect(&mut self) -> Result<(), Error<B::Error>> {
        self.xdcs.set_high().map_err(Error::pin)?;
        self.xcs.set_high().map_err(Error::pin)
    }

    /// Drive both select lines low. Together with the delays in
    /// `Vs10xx::begin` this resets boards that tie XRESET to XCS/XDCS.
    pub fn select_both(&mut self) -> Result<(), Error<B::Error>> {
        self.xdcs.set_low().map_err(Error::pin)?;
        self.xcs.set_low().map_err(Error::pin)
    }

    /// Reconfigure the bus clock.
    pub fn set_speed(&mut self, hz: u32) -> Result<(), Error<B::Error>> {
        self.bus.set_speed(hz).map_err(Error::Bus)
    }

    /// Open an SCI session.
    pub fn control_mode_on(&mut self) -> Result<(), Error<B::Error>> {
        self.open(Session::Control)?;
        self.xdcs.set_high().map_err(Error::pin)?;
        self.xcs.set_low().map_err(Error::pin)
    }

    /// Close an SCI session.
    pub fn control_mode_off(&mut self) -> Result<(), Error<B::Error>> {
        self.close()
    }

    /// Open an SDI session.
    pub fn data_mode_on(&mut self) -> Result<(), Error<B::Error>> {
        self.open(Session::Data)?;
        self.xcs.set_high().map_err(Error::pin)?;
        self.xdcs.set_low().map_err(Error::pin)
    }

    /// Close an SDI session.
    pub fn data_mode_off(&mut self) -> Result<(), Error<B::Error>> {
        self.close()
    }

    /// Give back bus and pins.
    pub fn release(self) -> (B, CS, DCS) {
        (self.bus, self.xcs, self.xdcs)
    }

    fn open(&mut self, session: Session) -> Result<(), Error<B::Error>> {
        if self.session != Session::Idle {
            return Err(Error::NestedTransaction);
        }
        self.bus.begin_transaction().map_err(Error::Bus)?;
        self.session = session;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error<B::Error>> {
        self.deselect()?;
        self.session = Session::Idle;
        self.bus.end_transaction().map_err(Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Sim;

    #[test]
    fn control_and_data_sessions_bracket_transactions() {
        let sim = Sim::vs1053();
        let mut t = Transport::new(sim.bus(), sim.xcs(), sim.xdcs());
        t.control_mode_on().unwrap();
        assert_eq!(t.session(), Session::Control);
        assert!(sim.borrow().xcs_low());
        assert!(!sim.borrow().xdcs_low());
        t.control_mode_off().unwrap();
        t.data_mode_on().unwrap();
        assert!(!sim.borrow().xcs_low());
        assert!(sim.borrow().xdcs_low());
        t.data_mode_off().unwrap();
        assert_eq!(t.session(), Session::Idle);
        assert_eq!(sim.borrow().transactions(), 2);
        assert!(!sim.borrow().in_transaction());
    }

    #[test]
    fn nested_session_is_rejected() {
        let sim = Sim::vs1053();
        let mut t = Transport::new(sim.bus(), sim.xcs(), sim.xdcs());
        t.control_mode_on().unwrap();
        assert_eq!(t.data_mode_on(), Err(Error::NestedTransaction));
        assert_eq!(sim.borrow().transactions(), 1);
    }
}
