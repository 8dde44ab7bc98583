//! Register-level VS10xx simulator for host tests
//!
//! [`SimChip`] models what the driver can observe over the control link:
//! the SCI register file, WRAM with address auto-increment, the SDI input,
//! DREQ and the select lines. [`Sim`] shares one chip between the bus, pin
//! and DREQ handles the driver owns, so tests can inspect and steer the
//! chip while the driver holds it.
//!
//! Behaviour knobs:
//!
//! | Knob                         | Effect                                          |
//! |------------------------------|-------------------------------------------------|
//! | `set_busy_after_transfer(n)` | DREQ reads low for `n` polls after each frame    |
//! | `set_dreq_stuck_low(true)`   | DREQ never rises (no chip on the bus)            |
//! | `set_cancel_latency(n)`      | SM_CANCEL clears on the `n+1`th MODE read        |
//! | `set_midi_plugin_works(b)`   | MIDI start sets AUDATA to 0xAC45 or 0x1F40       |
//! | `set_vol_read_mask(m)`       | XOR applied to SCI_VOL reads (bad wiring)        |
//! | `set_hdat1(Some(n))`         | Fixed SCI_HDAT1 value instead of the FIFO length |

use core::convert::Infallible;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use platform::mocks::MockTiming;
use platform::{ControlBus, Level, MemorySink};

use crate::driver::{NoPin, Vs10xx};
use crate::registers::{
    Register, AIADDR_MIDI_VS1003, AIADDR_MIDI_VS1053, AUDATA_MIDI_ACTIVE, SCI_READ, SCI_WRITE,
    SM_CANCEL, SM_RESET, VERSION_VS1003,
};

/// Driver type wired to a [`Sim`].
pub type SimDriver = Vs10xx<SimBus, SimPin, SimPin, SimDreq, MockTiming, NoPin, MemorySink>;

/// SCI_AUDATA after a plugin start that failed: the decoder's 8 kHz mono idle state.
pub const AUDATA_IDLE: u16 = 0x1F40;

/// SCI_STATUS of a freshly reset VS1053.
pub const STATUS_VS1053: u16 = 0x0040;
/// SCI_STATUS of a freshly reset VS1003.
pub const STATUS_VS1003: u16 = 0x0030;

/// Simulated chip state.
#[derive(Debug, Default)]
pub struct SimChip {
    regs: [u16; 16],
    wram: BTreeMap<u16, u16>,
    wram_addr: u16,

    xcs_low: bool,
    xdcs_low: bool,
    frame: Vec<u8>,
    read_latch: u16,

    in_transaction: bool,
    transactions: usize,
    nested: usize,
    bus_calls: usize,
    speeds: Vec<u32>,

    sci_bytes: Vec<u8>,
    sci_writes: Vec<(u8, u16)>,
    sci_reads: Vec<u8>,
    sdi: Vec<u8>,
    chunks: Vec<usize>,
    chunk_polls: Vec<usize>,
    polls_since_chunk: usize,
    dreq_polls: usize,

    busy_after_transfer: usize,
    busy_remaining: usize,
    dreq_stuck_low: bool,
    cancel_latency: Option<usize>,
    cancel_remaining: Option<usize>,
    midi_plugin_works: bool,
    vol_read_mask: u16,
    hdat1: Option<u16>,
    capture: VecDeque<u16>,
    soft_resets: usize,
    reset_pin: Vec<bool>,
}

impl SimChip {
    /// Chip reporting `status` in SCI_STATUS.
    pub fn with_status(status: u16) -> Self {
        let mut chip = Self {
            cancel_latency: Some(0),
            midi_plugin_works: true,
            ..Self::default()
        };
        chip.regs[usize::from(Register::Status.addr())] = status;
        chip
    }

    // -- knobs ---------------------------------------------------------------

    /// Hold DREQ low for `polls` polls after every SCI frame and SDI chunk.
    pub fn set_busy_after_transfer(&mut self, polls: usize) {
        self.busy_after_transfer = polls;
    }

    /// Keep DREQ low forever.
    pub fn set_dreq_stuck_low(&mut self, stuck: bool) {
        self.dreq_stuck_low = stuck;
    }

    /// MODE reads that still show SM_CANCEL; `None` never clears it.
    pub fn set_cancel_latency(&mut self, reads: Option<usize>) {
        self.cancel_latency = reads;
    }

    /// Whether starting the MIDI plugin makes SCI_AUDATA read 0xAC45.
    pub fn set_midi_plugin_works(&mut self, works: bool) {
        self.midi_plugin_works = works;
    }

    /// Corrupt SCI_VOL reads with `mask`.
    pub fn set_vol_read_mask(&mut self, mask: u16) {
        self.vol_read_mask = mask;
    }

    /// Override SCI_HDAT1.
    pub fn set_hdat1(&mut self, words: Option<u16>) {
        self.hdat1 = words;
    }

    /// Queue capture words for SCI_HDAT0.
    pub fn push_capture(&mut self, words: &[u16]) {
        self.capture.extend(words.iter().copied());
    }

    /// Set a register without logging a write.
    pub fn set_reg(&mut self, reg: Register, value: u16) {
        if let Some(slot) = self.regs.get_mut(usize::from(reg.addr())) {
            *slot = value;
        }
    }

    /// Set a WRAM word.
    pub fn set_wram(&mut self, addr: u16, value: u16) {
        self.wram.insert(addr, value);
    }

    /// Set the end-fill byte stored in WRAM.
    pub fn set_end_fill_byte(&mut self, byte: u8) {
        self.set_wram(crate::registers::WRAM_END_FILL_BYTE, u16::from(byte));
    }

    /// Forget everything recorded so far (knobs and memory stay).
    pub fn clear_log(&mut self) {
        self.transactions = 0;
        self.nested = 0;
        self.bus_calls = 0;
        self.speeds.clear();
        self.sci_bytes.clear();
        self.sci_writes.clear();
        self.sci_reads.clear();
        self.sdi.clear();
        self.chunks.clear();
        self.chunk_polls.clear();
        self.polls_since_chunk = 0;
        self.dreq_polls = 0;
        self.soft_resets = 0;
    }

    // -- observation ---------------------------------------------------------

    /// Register value.
    pub fn reg(&self, reg: Register) -> u16 {
        self.regs
            .get(usize::from(reg.addr()))
            .copied()
            .unwrap_or(0)
    }

    /// WRAM word (0 if never written).
    pub fn wram(&self, addr: u16) -> u16 {
        self.wram.get(&addr).copied().unwrap_or(0)
    }

    /// Every byte clocked in control mode.
    pub fn sci_bytes(&self) -> &[u8] {
        &self.sci_bytes
    }

    /// Every SCI write as `(address, value)`.
    pub fn sci_writes(&self) -> &[(u8, u16)] {
        &self.sci_writes
    }

    /// Every SCI read address.
    pub fn sci_reads(&self) -> &[u8] {
        &self.sci_reads
    }

    /// Values written to `reg`, in order.
    pub fn writes_to(&self, reg: Register) -> Vec<u16> {
        self.sci_writes
            .iter()
            .filter(|(addr, _)| *addr == reg.addr())
            .map(|&(_, value)| value)
            .collect()
    }

    /// Every byte received in data mode.
    pub fn sdi(&self) -> &[u8] {
        &self.sdi
    }

    /// Length of every SDI chunk.
    pub fn chunks(&self) -> &[usize] {
        &self.chunks
    }

    /// DREQ polls preceding each SDI chunk.
    pub fn chunk_polls(&self) -> &[usize] {
        &self.chunk_polls
    }

    /// Total DREQ polls.
    pub fn dreq_polls(&self) -> usize {
        self.dreq_polls
    }

    /// Bus transactions opened.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// Transactions opened while another was active.
    pub fn nested_transactions(&self) -> usize {
        self.nested
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Calls of any [`ControlBus`] method.
    pub fn bus_calls(&self) -> usize {
        self.bus_calls
    }

    /// Bus speeds requested, in order.
    pub fn speeds(&self) -> &[u32] {
        &self.speeds
    }

    /// Soft resets seen through SM_RESET.
    pub fn soft_resets(&self) -> usize {
        self.soft_resets
    }

    /// Levels driven on the reset pin (`true` = high).
    pub fn reset_pin(&self) -> &[bool] {
        &self.reset_pin
    }

    /// XCS currently low.
    pub fn xcs_low(&self) -> bool {
        self.xcs_low
    }

    /// XDCS currently low.
    pub fn xdcs_low(&self) -> bool {
        self.xdcs_low
    }

    // -- protocol ------------------------------------------------------------

    fn clock(&mut self, out: u8) -> u8 {
        match (self.xcs_low, self.xdcs_low) {
            (true, false) => self.clock_sci(out),
            (false, true) => {
                self.sdi.push(out);
                0
            }
            _ => 0,
        }
    }

    fn clock_sci(&mut self, out: u8) -> u8 {
        self.sci_bytes.push(out);
        self.frame.push(out);
        let frame = self.frame.clone();
        match *frame.as_slice() {
            [SCI_READ, addr] => {
                self.sci_reads.push(addr);
                self.read_latch = self.read_reg(addr);
                0
            }
            [SCI_READ, _, _] => self.read_latch.to_be_bytes()[0],
            [SCI_READ, _, _, _] => {
                self.end_frame();
                self.read_latch.to_be_bytes()[1]
            }
            [SCI_WRITE, addr, hi, lo] => {
                self.write_reg(addr, u16::from_be_bytes([hi, lo]));
                self.end_frame();
                0
            }
            _ => 0,
        }
    }

    fn end_frame(&mut self) {
        self.frame.clear();
        self.busy_remaining = self.busy_after_transfer;
    }

    fn read_reg(&mut self, addr: u8) -> u16 {
        match Register::from_addr(addr) {
            Some(Register::Wram) => {
                let value = self.wram(self.wram_addr);
                self.wram_addr = self.wram_addr.wrapping_add(1);
                value
            }
            Some(Register::HDat0) => self.capture.pop_front().unwrap_or(0),
            Some(Register::HDat1) => self
                .hdat1
                .unwrap_or_else(|| u16::try_from(self.capture.len()).unwrap_or(u16::MAX)),
            Some(Register::Vol) => self.reg(Register::Vol) ^ self.vol_read_mask,
            Some(Register::Mode) => {
                if self.reg(Register::Mode) & SM_CANCEL != 0 {
                    match self.cancel_remaining {
                        Some(0) => {
                            let mode = self.reg(Register::Mode) & !SM_CANCEL;
                            self.set_reg(Register::Mode, mode);
                        }
                        Some(n) => self.cancel_remaining = Some(n.saturating_sub(1)),
                        None => {}
                    }
                }
                self.reg(Register::Mode)
            }
            Some(reg) => self.reg(reg),
            None => 0,
        }
    }

    fn write_reg(&mut self, addr: u8, value: u16) {
        self.sci_writes.push((addr, value));
        match Register::from_addr(addr) {
            Some(Register::Mode) if value & SM_RESET != 0 => {
                self.soft_resets = self.soft_resets.saturating_add(1);
                self.set_reg(Register::Mode, value & !SM_RESET);
                self.set_reg(Register::DecodeTime, 0);
            }
            Some(Register::Mode) => {
                if value & SM_CANCEL != 0 {
                    self.cancel_remaining = self.cancel_latency;
                }
                self.set_reg(Register::Mode, value);
            }
            Some(Register::WramAddr) => {
                self.wram_addr = value;
                self.set_reg(Register::WramAddr, value);
            }
            Some(Register::Wram) => {
                self.wram.insert(self.wram_addr, value);
                self.wram_addr = self.wram_addr.wrapping_add(1);
            }
            Some(Register::AiAddr) => {
                self.set_reg(Register::AiAddr, value);
                let entry = if self.version() == VERSION_VS1003 {
                    AIADDR_MIDI_VS1003
                } else {
                    AIADDR_MIDI_VS1053
                };
                if value == entry {
                    let audata = if self.midi_plugin_works {
                        AUDATA_MIDI_ACTIVE
                    } else {
                        AUDATA_IDLE
                    };
                    self.set_reg(Register::AuData, audata);
                }
            }
            Some(reg) => self.set_reg(reg, value),
            None => {}
        }
    }

    fn version(&self) -> u8 {
        crate::chip::status_version(self.reg(Register::Status))
    }

    fn poll_dreq(&mut self) -> bool {
        self.dreq_polls = self.dreq_polls.saturating_add(1);
        self.polls_since_chunk = self.polls_since_chunk.saturating_add(1);
        if self.dreq_stuck_low {
            return false;
        }
        if self.busy_remaining > 0 {
            self.busy_remaining = self.busy_remaining.saturating_sub(1);
            return false;
        }
        true
    }

    fn begin_chunk(&mut self, len: usize) {
        self.chunks.push(len);
        self.chunk_polls.push(self.polls_since_chunk);
        self.polls_since_chunk = 0;
    }
}

/// Shared handle to a [`SimChip`].
#[derive(Debug, Clone)]
pub struct Sim(Rc<RefCell<SimChip>>);

impl Sim {
    /// Simulator around `chip`.
    pub fn new(chip: SimChip) -> Self {
        Self(Rc::new(RefCell::new(chip)))
    }

    /// VS1053 with DREQ always ready.
    pub fn vs1053() -> Self {
        Self::new(SimChip::with_status(STATUS_VS1053))
    }

    /// VS1003 with DREQ always ready.
    pub fn vs1003() -> Self {
        Self::new(SimChip::with_status(STATUS_VS1003))
    }

    /// Inspect the chip.
    pub fn borrow(&self) -> Ref<'_, SimChip> {
        self.0.borrow()
    }

    /// Steer the chip.
    pub fn borrow_mut(&self) -> RefMut<'_, SimChip> {
        self.0.borrow_mut()
    }

    /// Bus handle.
    pub fn bus(&self) -> SimBus {
        SimBus(Rc::clone(&self.0))
    }

    /// XCS handle.
    pub fn xcs(&self) -> SimPin {
        SimPin {
            chip: Rc::clone(&self.0),
            role: PinRole::Xcs,
        }
    }

    /// XDCS handle.
    pub fn xdcs(&self) -> SimPin {
        SimPin {
            chip: Rc::clone(&self.0),
            role: PinRole::Xdcs,
        }
    }

    /// XRESET handle.
    pub fn reset(&self) -> SimPin {
        SimPin {
            chip: Rc::clone(&self.0),
            role: PinRole::Reset,
        }
    }

    /// DREQ handle.
    pub fn dreq(&self) -> SimDreq {
        SimDreq(Rc::clone(&self.0))
    }

    /// Driver wired to this chip, logging everything to a [`MemorySink`].
    pub fn driver(&self) -> SimDriver {
        self.driver_with(crate::DriverConfig::new())
    }

    /// Like [`Sim::driver`] with `config`; the log level is forced to debug.
    pub fn driver_with(&self, config: crate::DriverConfig) -> SimDriver {
        Vs10xx::new(
            self.bus(),
            self.xcs(),
            self.xdcs(),
            self.dreq(),
            MockTiming::new(),
        )
        .with_logger(MemorySink::new())
        .with_config(config.with_log_level(Level::Debug))
    }
}

/// [`ControlBus`] end of the simulator.
#[derive(Debug, Clone)]
pub struct SimBus(Rc<RefCell<SimChip>>);

impl SimBus {
    fn chip(&self) -> RefMut<'_, SimChip> {
        let mut chip = self.0.borrow_mut();
        chip.bus_calls = chip.bus_calls.saturating_add(1);
        chip
    }
}

impl ControlBus for SimBus {
    type Error = Infallible;

    fn begin_transaction(&mut self) -> Result<(), Self::Error> {
        let mut chip = self.chip();
        if chip.in_transaction {
            chip.nested = chip.nested.saturating_add(1);
        }
        chip.in_transaction = true;
        chip.transactions = chip.transactions.saturating_add(1);
        Ok(())
    }

    fn end_transaction(&mut self) -> Result<(), Self::Error> {
        self.chip().in_transaction = false;
        Ok(())
    }

    fn set_speed(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.chip().speeds.push(hz);
        Ok(())
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.chip().clock(byte);
        Ok(())
    }

    fn transfer(&mut self, byte: u8) -> Result<u8, Self::Error> {
        Ok(self.chip().clock(byte))
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.chip();
        if chip.xdcs_low {
            chip.begin_chunk(data.len());
        }
        for &byte in data {
            chip.clock(byte);
        }
        if chip.xdcs_low {
            chip.busy_remaining = chip.busy_after_transfer;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinRole {
    Xcs,
    Xdcs,
    Reset,
}

/// Select or reset line of the simulator.
#[derive(Debug, Clone)]
pub struct SimPin {
    chip: Rc<RefCell<SimChip>>,
    role: PinRole,
}

impl SimPin {
    fn drive(&mut self, high: bool) {
        let mut chip = self.chip.borrow_mut();
        match self.role {
            PinRole::Xcs => {
                chip.xcs_low = !high;
                chip.frame.clear();
            }
            PinRole::Xdcs => chip.xdcs_low = !high,
            PinRole::Reset => chip.reset_pin.push(high),
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// DREQ line of the simulator.
#[derive(Debug, Clone)]
pub struct SimDreq(Rc<RefCell<SimChip>>);

impl ErrorType for SimDreq {
    type Error = Infallible;
}

impl InputPin for SimDreq {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.borrow_mut().poll_dreq())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.borrow_mut().poll_dreq())
    }
}
