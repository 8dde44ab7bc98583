//! Mode state machine: output, MIDI and capture, end to end on the simulator.

use platform::{AudioCodec, Level, VolumePercent};
use vs10xx::clock::ClockSolver;
use vs10xx::registers::{GPIO_DDR, SM_ADPCM, SM_CANCEL, SM_SDINEW};
use vs10xx::sim::{Sim, SimChip, AUDATA_IDLE};
use vs10xx::{
    DriverConfig, Error, Firmware, FirmwareSlot, InputSource, Mode, Register, RecordingOptions,
};

// Tiny plugin tables: each points SCI_WRAMADDR somewhere harmless.
static GENERIC: [u16; 6] = [0x0007, 0x0001, 0x8010, 0x0006, 0x8002, 0x00AA];
static MIDI_1053: [u16; 3] = [0x0007, 0x0001, 0x8050];
static MIDI_1003: [u16; 3] = [0x0007, 0x0001, 0x0030];
static PCM_1053: [u16; 3] = [0x0007, 0x0001, 0x8020];
static PCM_1003: [u16; 3] = [0x0007, 0x0001, 0x0030];

fn firmware() -> Firmware {
    Firmware::none()
        .with(FirmwareSlot::Generic, &GENERIC)
        .with(FirmwareSlot::MidiVs1053, &MIDI_1053)
        .with(FirmwareSlot::MidiVs1003, &MIDI_1003)
        .with(FirmwareSlot::PcmVs1053, &PCM_1053)
        .with(FirmwareSlot::PcmVs1003, &PCM_1003)
}

fn config() -> DriverConfig {
    DriverConfig::new().with_firmware(firmware())
}

// ── Output ───────────────────────────────────────────────────────────────────

#[test]
fn begin_output_primes_and_patches_vs1053() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_end_fill_byte(0x5A);
    let mut vs = sim.driver_with(config());

    vs.begin_output().unwrap();

    assert_eq!(vs.mode(), Mode::Output);
    let chip = sim.borrow();
    assert_eq!(chip.sdi(), [0x5A; 10]);
    // MIDI-strapped boards are forced to MP3 mode
    assert_eq!(chip.wram(GPIO_DDR), 3);
    assert_eq!(chip.soft_resets(), 1);
    assert_eq!(chip.wram(0x8010), 0x00AA);
    assert_eq!(chip.wram(0x8011), 0x00AA);
}

#[test]
fn begin_output_skips_generic_patch_on_vs1003() {
    let sim = Sim::vs1003();
    let mut vs = sim.driver_with(config());
    vs.begin_output().unwrap();
    assert_eq!(vs.mode(), Mode::Output);
    assert_eq!(sim.borrow().wram(0x8010), 0);
}

#[test]
fn begin_output_patch_can_be_disabled() {
    let sim = Sim::vs1053();
    let mut cfg = config();
    cfg.load_default_patches = false;
    let mut vs = sim.driver_with(cfg);
    vs.begin_output().unwrap();
    assert_eq!(sim.borrow().wram(0x8010), 0);
}

#[test]
fn unknown_family_still_plays_but_cannot_capture_or_run_midi() {
    // SS_VER 6 is a VS1063
    let sim = Sim::new(SimChip::with_status(0x0060));
    let mut vs = sim.driver_with(config());

    vs.begin_output().unwrap();
    assert_eq!(vs.mode(), Mode::Output);
    assert_eq!(vs.chip_family(), None);
    assert_eq!(sim.borrow().wram(0x8010), 0);
    vs.write_audio(&[0xFF, 0xFB]).unwrap();

    assert_eq!(vs.begin_midi(), Err(Error::UnsupportedChip { version: 6 }));
    assert_eq!(vs.mode(), Mode::NotActive);
    assert!(sim.borrow().writes_to(Register::AiAddr).is_empty());

    assert_eq!(
        vs.begin_input(&mut RecordingOptions::new()),
        Err(Error::UnsupportedChip { version: 6 })
    );
    assert_eq!(vs.mode(), Mode::NotActive);
    assert!(sim.borrow().writes_to(Register::AiCtrl0).is_empty());
}

#[test]
fn write_audio_streams_in_output_mode() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    vs.begin_output().unwrap();
    sim.borrow_mut().clear_log();

    let mp3: Vec<u8> = (0..=199u8).collect();
    vs.write_audio(&mp3).unwrap();

    let chip = sim.borrow();
    assert_eq!(chip.sdi(), &mp3[..]);
    assert_eq!(chip.chunks(), [32, 32, 32, 32, 32, 32, 8]);
    assert_eq!(chip.transactions(), 1);
}

#[test]
fn write_audio_needs_an_output_mode() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    assert_eq!(
        vs.write_audio(&[1, 2, 3]),
        Err(Error::WrongMode {
            expected: Mode::Output,
            actual: Mode::NotActive,
        })
    );
    assert_eq!(sim.borrow().bus_calls(), 0);
}

#[test]
fn stop_song_flushes_and_cancels() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    vs.begin_output().unwrap();
    sim.borrow_mut().clear_log();

    vs.stop_song().unwrap();

    let chip = sim.borrow();
    assert_eq!(chip.sdi().len(), 2052 + 32 + 2052);
    assert_eq!(chip.writes_to(Register::Mode), [SM_SDINEW | SM_CANCEL]);
    drop(chip);
    assert!(vs.logger().sink().contains("Song stopped correctly after 0 msec"));
}

#[test]
fn stop_song_waits_for_slow_cancel() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_cancel_latency(Some(3));
    let mut vs = sim.driver();
    vs.begin_output().unwrap();
    sim.borrow_mut().clear_log();

    vs.stop_song().unwrap();
    assert_eq!(sim.borrow().sdi().len(), 2052 + 4 * 32 + 2052);
    assert!(vs.logger().sink().contains("after 30 msec"));
}

#[test]
fn stop_song_times_out_when_cancel_sticks() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_cancel_latency(None);
    let mut vs = sim.driver();
    vs.begin_output().unwrap();

    assert_eq!(vs.stop_song(), Err(Error::CancelTimeout));
    let sink = vs.logger().sink();
    assert!(sink.contains("Song stopped incorrectly!"));
    assert!(sink.contains("REG   Contents"));
}

#[test]
fn audio_codec_trait_drives_playback() {
    fn play<C: AudioCodec>(codec: &mut C, data: &[u8]) -> Result<(), C::Error> {
        codec.init()?;
        codec.set_volume(VolumePercent::new(80))?;
        codec.start()?;
        codec.write_audio(data)?;
        codec.stop()
    }

    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    play(&mut vs, &[0xFF, 0xFB, 0x90, 0x00]).unwrap();

    assert_eq!(vs.mode(), Mode::Output);
    assert_eq!(vs.volume(), VolumePercent::new(80));
    // 254 - 80 * 254 / 100 = 51 on both channels
    assert_eq!(sim.borrow().writes_to(Register::Vol).last(), Some(&0x3333));
}

// ── MIDI ─────────────────────────────────────────────────────────────────────

#[test]
fn begin_midi_activates_plugin_on_vs1053() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver_with(config());

    vs.begin_midi().unwrap();

    assert_eq!(vs.mode(), Mode::Midi);
    assert_eq!(sim.borrow().writes_to(Register::AiAddr), [0x0050]);
    assert!(vs.logger().sink().contains("Midi active"));
}

#[test]
fn begin_midi_uses_vs1003_entry_point() {
    let sim = Sim::vs1003();
    let mut vs = sim.driver_with(config());
    vs.begin_midi().unwrap();
    assert_eq!(sim.borrow().writes_to(Register::AiAddr), [0x0030]);
}

#[test]
fn begin_midi_reports_inactive_plugin() {
    let sim = Sim::vs1053();
    sim.borrow_mut().set_midi_plugin_works(false);
    let mut vs = sim.driver_with(config());

    assert_eq!(
        vs.begin_midi(),
        Err(Error::MidiInactive {
            audata: AUDATA_IDLE
        })
    );
    assert_eq!(vs.mode(), Mode::NotActive);
    assert!(vs.logger().sink().contains("Midi inactive"));
}

#[test]
fn begin_midi_without_plugin_table_fails() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    assert_eq!(
        vs.begin_midi(),
        Err(Error::MissingFirmware(FirmwareSlot::MidiVs1053))
    );
}

#[test]
fn midi_messages_are_framed_and_streamed() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver_with(config());
    vs.begin_midi().unwrap();
    sim.borrow_mut().clear_log();

    vs.send_midi_message(0x90, 60, 127).unwrap();
    vs.send_midi_message(0xC0, 5, 0).unwrap();

    assert_eq!(
        sim.borrow().sdi(),
        [0, 0x90, 0, 60, 0, 127, 0, 0xC0, 0, 5]
    );
}

#[test]
fn midi_message_outside_midi_mode_only_warns() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();

    vs.send_midi_message(0x90, 60, 127).unwrap();

    assert_eq!(sim.borrow().bus_calls(), 0);
    let sink = vs.logger().sink();
    assert_eq!(sink.count(Level::Warning), 1);
    assert!(sink.contains("beginMidi not called"));
}

#[test]
fn write_audio_pads_bytes_in_midi_mode() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver_with(config());
    vs.begin_midi().unwrap();
    sim.borrow_mut().clear_log();

    vs.write_audio(&[0x90, 0x3C, 0x7F]).unwrap();
    assert_eq!(sim.borrow().sdi(), [0, 0x90, 0, 0x3C, 0, 0x7F]);
}

// ── Capture ──────────────────────────────────────────────────────────────────

#[test]
fn begin_input_vs1003_programs_clock_and_encoder() {
    let sim = Sim::vs1003();
    let mut vs = sim.driver_with(config());
    let mut options = RecordingOptions::new();
    options.set_gain_percent(50);

    vs.begin_input(&mut options).unwrap();

    assert_eq!(vs.mode(), Mode::Input);
    let chip = sim.borrow();
    // 8 kHz = 2.0 x 12.288 MHz / 256 / 12
    assert_eq!(chip.writes_to(Register::ClockF).last(), Some(&0x2000));
    assert_eq!(chip.writes_to(Register::AiCtrl0), [12]);
    assert_eq!(chip.writes_to(Register::AiCtrl1), [512]);
    assert_eq!(chip.writes_to(Register::Mode).last(), Some(&(SM_SDINEW | SM_ADPCM)));
    assert_eq!(chip.writes_to(Register::AiAddr), [0x0030]);
    assert_eq!(options.sample_rate().get(), 8_000);
}

#[test]
fn begin_input_vs1003_reports_effective_rate() {
    let sim = Sim::vs1003();
    let mut vs = sim.driver_with(config());
    let mut options = RecordingOptions::new();
    options.set_sample_rate(11_025);

    vs.begin_input(&mut options).unwrap();

    let expected = ClockSolver::default().solve(11_025).unwrap();
    assert_eq!(options.sample_rate().get(), expected.rate_hz);
    assert_eq!(sim.borrow().writes_to(Register::AiCtrl0), [expected.divider]);
}

#[test]
fn begin_input_vs1003_aux_selects_line_in() {
    let sim = Sim::vs1003();
    let mut vs = sim.driver_with(config());
    let mut options = RecordingOptions::new();
    options.set_input(InputSource::Aux);
    vs.begin_input(&mut options).unwrap();
    let mode = sim.borrow().writes_to(Register::Mode).last().copied().unwrap();
    assert_ne!(mode & 0x4000, 0);
}

#[test]
fn vs1003_stereo_capture_repeats_each_sample() {
    let sim = Sim::vs1003();
    let mut vs = sim.driver_with(config());
    let mut options = RecordingOptions::new();
    options.set_channels(2);
    vs.begin_input(&mut options).unwrap();

    sim.borrow_mut().push_capture(&[0x0102, 0x0304, 0x0506]);
    assert_eq!(vs.available().unwrap(), 3 * 2 * 2);

    let mut buf = [0u8; 10];
    // only whole 4-byte frames are written
    assert_eq!(vs.read_bytes(&mut buf).unwrap(), 8);
    assert_eq!(buf[..8], [0x02, 0x01, 0x02, 0x01, 0x04, 0x03, 0x04, 0x03]);
}

#[test]
fn begin_input_vs1053_programs_plugin_and_drops_header() {
    let sim = Sim::vs1053();
    let words: Vec<u16> = (0..30).collect();
    sim.borrow_mut().push_capture(&words);
    let mut vs = sim.driver_with(config());
    let mut options = RecordingOptions::new();
    options.set_sample_rate(16_000);
    options.set_gain_percent(100);

    vs.begin_input(&mut options).unwrap();

    assert_eq!(vs.mode(), Mode::Input);
    {
        let chip = sim.borrow();
        assert_eq!(chip.writes_to(Register::AiCtrl0), [16_000]);
        assert_eq!(chip.writes_to(Register::AiCtrl1), [1024]);
        assert_eq!(chip.writes_to(Register::AiCtrl2), [0]);
        // left channel, linear PCM
        assert_eq!(chip.writes_to(Register::AiCtrl3), [6]);
        assert_eq!(chip.soft_resets(), 1);
        assert_eq!(chip.reg(Register::Mode) & SM_ADPCM, SM_ADPCM);
        assert!(chip.writes_to(Register::AiAddr).is_empty());
    }

    // the 44-byte header (22 words) is gone
    assert_eq!(vs.available().unwrap(), 8 * 2);
    let mut buf = [0u8; 4];
    assert_eq!(vs.read_bytes(&mut buf).unwrap(), 4);
    assert_eq!(buf, [22, 0, 23, 0]);
}

#[test]
fn begin_input_vs1053_keeps_header_on_request() {
    let sim = Sim::vs1053();
    sim.borrow_mut().push_capture(&[7; 30]);
    let mut vs = sim.driver_with(config());
    let mut options = RecordingOptions::new();
    options.set_keep_wav_header(true);
    vs.begin_input(&mut options).unwrap();
    assert_eq!(vs.available().unwrap(), 30 * 2);
}

#[test]
fn missing_wav_header_times_out_with_warning() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver_with(config());
    let mut options = RecordingOptions::new();

    vs.begin_input(&mut options).unwrap();

    assert!(vs
        .logger()
        .sink()
        .contains("WAV header not available, dropping anyway"));
    let parts = vs.release();
    assert!(parts.timing.yield_count() >= 100);
}

#[test]
fn glitched_word_count_reports_nothing_available() {
    let sim = Sim::vs1053();
    sim.borrow_mut().push_capture(&[0; 30]);
    let mut vs = sim.driver_with(config());
    vs.begin_input(&mut RecordingOptions::new()).unwrap();
    sim.borrow_mut().set_hdat1(Some(1025));
    assert_eq!(vs.available().unwrap(), 0);
}

#[test]
fn end_leaves_capture_mode() {
    let sim = Sim::vs1053();
    sim.borrow_mut().push_capture(&[0; 30]);
    let mut vs = sim.driver_with(config());
    vs.begin_input(&mut RecordingOptions::new()).unwrap();

    vs.end().unwrap();

    assert_eq!(vs.mode(), Mode::NotActive);
    assert_eq!(sim.borrow().reg(Register::Mode) & SM_ADPCM, 0);
    assert_eq!(vs.available().unwrap(), 0);
}

#[test]
fn begin_input_without_plugin_fails() {
    let sim = Sim::vs1053();
    let mut vs = sim.driver();
    assert_eq!(
        vs.begin_input(&mut RecordingOptions::new()),
        Err(Error::MissingFirmware(FirmwareSlot::PcmVs1053))
    );
    assert_eq!(vs.mode(), Mode::NotActive);
}
