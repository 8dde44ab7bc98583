//! Initialization sequence against the register-level simulator.

use platform::Level;
use vs10xx::registers::{CLOCKF_INIT, SM_LINE1, SM_SDINEW, WRAM_END_FILL_BYTE};
use vs10xx::sim::{Sim, SimChip};
use vs10xx::{ChipFamily, DriverConfig, Error, Mode, Register};

#[test]
fn vs1053_begin_detects_family_and_end_fill_byte() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_end_fill_byte(0xAB);
    let mut vs = sim.driver();

    vs.begin().unwrap();

    assert_eq!(vs.chip_family(), Some(ChipFamily::Vs1053));
    assert_eq!(vs.end_fill_byte(), 0xAB);
    assert_eq!(vs.mode(), Mode::NotActive);

    let chip = sim.borrow();
    assert_eq!(chip.speeds(), [200_000, 4_000_000]);
    assert_eq!(chip.writes_to(Register::ClockF), [CLOCKF_INIT]);
    assert_eq!(chip.writes_to(Register::Mode), [SM_SDINEW | SM_LINE1]);
    assert_eq!(chip.writes_to(Register::WramAddr), [WRAM_END_FILL_BYTE]);
    assert!(!chip.in_transaction());
    assert_eq!(chip.nested_transactions(), 0);
}

#[test]
fn vs1003_begin_detects_family() {
    let sim = Sim::vs1003();
    let mut vs = sim.driver();
    vs.begin().unwrap();
    assert_eq!(vs.chip_family(), Some(ChipFamily::Vs1003));
    assert!(vs.logger().sink().contains("VS1003 (3)"));
}

#[test]
fn begin_sets_select_lines_idle() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    vs.begin().unwrap();
    let chip = sim.borrow();
    assert!(!chip.xcs_low());
    assert!(!chip.xdcs_low());
}

#[test]
fn dreq_stuck_low_reports_not_connected() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_dreq_stuck_low(true);
    let mut vs = sim.driver();

    assert_eq!(vs.begin(), Err(Error::NotConnected));
    assert!(sim.borrow().sci_writes().is_empty());
    assert!(vs.logger().sink().contains("not properly installed!"));
    assert_eq!(vs.chip_family(), None);
}

#[test]
fn floating_status_reports_not_connected() {
    for status in [0x0000, 0xFFFF] {
        let sim = Sim::new(SimChip::with_status(status));
        let mut vs = sim.driver();
        assert_eq!(vs.begin(), Err(Error::NotConnected), "status {status:#06X}");
    }
}

#[test]
fn unknown_version_is_logged_and_accepted() {
    // SS_VER 2 is a VS1002
    let sim = Sim::new(SimChip::with_status(0x0020));
    let mut vs = sim.driver();
    vs.begin().unwrap();
    assert_eq!(vs.chip_family(), None);
    assert_eq!(vs.mode(), Mode::NotActive);
    assert!(vs.logger().sink().contains("Unsupported chip: (2)"));
}

#[test]
fn status_is_read_once_per_initialization() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    vs.begin_output().unwrap();
    let status_reads = sim
        .borrow()
        .sci_reads()
        .iter()
        .filter(|&&addr| addr == Register::Status.addr())
        .count();
    assert_eq!(status_reads, 1);
}

#[test]
fn self_test_mismatches_degrade_without_aborting() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_vol_read_mask(0x0001);
    let mut vs = sim.driver();

    vs.begin().unwrap();

    let sink = vs.logger().sink();
    let retries = sink
        .lines()
        .iter()
        .filter(|(_, line)| line.contains("error retry"))
        .count();
    // each pass gives up after the configured error budget
    assert_eq!(retries, 2 * 20);
    assert!(sink.contains("self-test mismatches: slow 20, fast 20"));
    assert_eq!(vs.chip_family(), Some(ChipFamily::Vs1053));
}

#[test]
fn clean_self_test_logs_no_warnings() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    vs.begin().unwrap();
    assert_eq!(vs.logger().sink().count(Level::Warning), 0);
}

#[test]
fn custom_bus_speeds_are_used() {
    let sim = Sim::vs1053();
    let mut config = DriverConfig::new();
    config.slow_spi_hz = 100_000;
    config.fast_spi_hz = 8_000_000;
    let mut vs = sim.driver_with(config);
    vs.begin().unwrap();
    assert_eq!(sim.borrow().speeds(), [100_000, 8_000_000]);
}

#[test]
fn dreq_waits_yield_to_the_scheduler() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_busy_after_transfer(1);
    let mut vs = sim.driver();
    vs.begin().unwrap();
    let parts = vs.release();
    assert!(parts.timing.yield_count() > 0);
}
