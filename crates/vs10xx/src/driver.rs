//! VS10xx device handle and mode state machine
//!
//! ```text
//!                 begin_output ──▶ Output
//! NotActive ──┬── begin_input  ──▶ Input
//!             └── begin_midi   ──▶ Midi   (only if the plugin answers)
//!
//! end() ──▶ NotActive (soft reset, SM_ADPCM cleared)
//! ```
//!
//! Every `begin_*` runs the full initialization sequence first: select-line
//! reset, slow bus self-test, clock programming, fast bus self-test,
//! end-fill byte readout and chip family detection.

use embedded_hal::digital::{InputPin, OutputPin};
use platform::{Balance, ControlBus, LogSink, Logger, NullSink, Timing, VolumePercent};

use crate::chip::{status_version, ChipFamily, Mode};
use crate::clock::ClockSolver;
use crate::config::{DriverConfig, FirmwareSlot};
use crate::equalizer::Equalizer;
use crate::error::Error;
use crate::recording::{InputSource, RecordingOptions, WAV_HEADER_BYTES};
use crate::registers::{
    Register, AIADDR_MIDI_VS1003, AIADDR_MIDI_VS1053, AIADDR_PCM_VS1003, AUDATA_44K1_STEREO,
    AUDATA_MIDI_ACTIVE, CLOCKF_FREQ_MASK, CLOCKF_INIT, SM_ADPCM, SM_LINE1, SM_RESET, SM_SDINEW,
    WRAM_END_FILL_BYTE,
};
use crate::transport::Transport;

/// Placeholder for a board without a dedicated XRESET line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl embedded_hal::digital::ErrorType for NoPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Everything handed back by [`Vs10xx::release`].
#[derive(Debug)]
pub struct Parts<B, CS, DCS, DREQ, RST, T, S> {
    /// Bus transport
    pub bus: B,
    /// XCS (SCI chip select)
    pub xcs: CS,
    /// XDCS (SDI data select)
    pub xdcs: DCS,
    /// DREQ input
    pub dreq: DREQ,
    /// XRESET output, if one was attached
    pub reset: Option<RST>,
    /// Delay/yield provider
    pub timing: T,
    /// Log sink
    pub sink: S,
}

/// Driver for a VS1053 or VS1003 on a shared serial bus.
///
/// Constructing the handle touches no hardware; call one of the `begin_*`
/// methods to initialize the chip. Dropping it needs no teardown.
#[derive(Debug)]
pub struct Vs10xx<B, CS, DCS, DREQ, T, RST = NoPin, S = NullSink> {
    pub(crate) transport: Transport<B, CS, DCS>,
    pub(crate) dreq: DREQ,
    pub(crate) reset: Option<RST>,
    pub(crate) timing: T,
    pub(crate) log: Logger<S>,
    pub(crate) config: DriverConfig,
    pub(crate) volume: VolumePercent,
    pub(crate) balance: Balance,
    pub(crate) equalizer: Equalizer,
    pub(crate) end_fill_byte: u8,
    pub(crate) version: Option<u8>,
    pub(crate) family: Option<ChipFamily>,
    pub(crate) mode: Mode,
    pub(crate) channel_multiplier: u8,
}

impl<B, CS, DCS, DREQ, T> Vs10xx<B, CS, DCS, DREQ, T>
where
    B: ControlBus,
    CS: OutputPin,
    DCS: OutputPin,
    DREQ: InputPin,
    T: Timing,
{
    /// Handle with default configuration, no reset pin and no logging.
    pub fn new(bus: B, xcs: CS, xdcs: DCS, dreq: DREQ, timing: T) -> Self {
        let config = DriverConfig::new();
        Self {
            transport: Transport::new(bus, xcs, xdcs),
            dreq,
            reset: None,
            timing,
            log: Logger::new(NullSink, config.log_level),
            config,
            volume: VolumePercent::MAX,
            balance: Balance::CENTER,
            equalizer: Equalizer::default(),
            end_fill_byte: 0,
            version: None,
            family: None,
            mode: Mode::NotActive,
            channel_multiplier: 1,
        }
    }
}

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
    /// Attach a dedicated XRESET line.
    pub fn with_reset<R: OutputPin>(self, reset: R) -> Vs10xx<B, CS, DCS, DREQ, T, R, S> {
        Vs10xx {
            transport: self.transport,
            dreq: self.dreq,
            reset: Some(reset),
            timing: self.timing,
            log: self.log,
            config: self.config,
            volume: self.volume,
            balance: self.balance,
            equalizer: self.equalizer,
            end_fill_byte: self.end_fill_byte,
            version: self.version,
            family: self.family,
            mode: self.mode,
            channel_multiplier: self.channel_multiplier,
        }
    }

    /// Route diagnostics to `sink`, keeping the configured minimum level.
    pub fn with_logger<S2: LogSink>(self, sink: S2) -> Vs10xx<B, CS, DCS, DREQ, T, RST, S2> {
        Vs10xx {
            transport: self.transport,
            dreq: self.dreq,
            reset: self.reset,
            timing: self.timing,
            log: Logger::new(sink, self.log.min_level()),
            config: self.config,
            volume: self.volume,
            balance: self.balance,
            equalizer: self.equalizer,
            end_fill_byte: self.end_fill_byte,
            version: self.version,
            family: self.family,
            mode: self.mode,
            channel_multiplier: self.channel_multiplier,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.log.set_min_level(config.log_level);
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Current operating mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Chip family detected by the last initialization.
    pub fn chip_family(&self) -> Option<ChipFamily> {
        self.family
    }

    /// Byte used to pad the stream buffer, read from WRAM during init.
    pub fn end_fill_byte(&self) -> u8 {
        self.end_fill_byte
    }

    /// Diagnostics logger.
    pub fn logger(&self) -> &Logger<S> {
        &self.log
    }

    /// Diagnostics logger, mutable (e.g. to change the minimum level).
    pub fn logger_mut(&mut self) -> &mut Logger<S> {
        &mut self.log
    }

    /// Hand back all owned resources.
    pub fn release(self) -> Parts<B, CS, DCS, DREQ, RST, T, S> {
        let (bus, xcs, xdcs) = self.transport.release();
        Parts {
            bus,
            xcs,
            xdcs,
            dreq: self.dreq,
            reset: self.reset,
            timing: self.timing,
            sink: self.log.into_sink(),
        }
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Reset and probe the chip, leaving it in [`Mode::NotActive`].
    ///
    /// Fails with [`Error::NotConnected`] when DREQ never rises or SCI_STATUS
    /// reads 0x0000/0xFFFF. Parts other than VS1003/VS1053 are logged and
    /// accepted; only the family-specific modes reject them later.
    /// Read-back mismatches during the bus self-tests are logged and do not
    /// abort initialization.
    pub fn begin(&mut self) -> Result<(), Error<B::Error>> {
        self.log.debug(format_args!("begin"));
        self.mode = Mode::NotActive;
        self.family = None;
        self.version = None;
        self.channel_multiplier = 1;

        if let Some(reset) = self.reset.as_mut() {
            reset.set_high().map_err(Error::pin)?;
            self.timing.delay_ms(500);
        }

        self.transport.deselect()?;
        self.timing.delay_ms(100);
        self.log.info(format_args!("Reset..."));
        // XCS and XDCS low together pull XRESET low on most breakout boards
        self.transport.select_both()?;
        self.timing.delay_ms(500);
        self.log.info(format_args!("End reset..."));
        self.transport.deselect()?;
        self.timing.delay_ms(500);

        self.transport.set_speed(self.config.slow_spi_hz)?;
        self.timing.delay_ms(20);

        let slow_errors = self.self_test(
            self.config.self_test_step_slow,
            "Slow SPI,Testing read/write registers...",
        )?;

        self.write_register(Register::AuData, AUDATA_44K1_STEREO)?;
        self.write_register(Register::ClockF, CLOCKF_INIT)?;
        self.transport.set_speed(self.config.fast_spi_hz)?;
        self.write_register(Register::Mode, SM_SDINEW | SM_LINE1)?;

        let fast_errors = self.self_test(
            self.config.self_test_step_fast,
            "Fast SPI, Testing read/write registers again...",
        )?;
        if slow_errors > 0 || fast_errors > 0 {
            self.log.warn(format_args!(
                "self-test mismatches: slow {slow_errors}, fast {fast_errors}"
            ));
        }

        self.timing.delay_ms(10);
        self.wait_dreq()?;
        let [_, fill] = self.wram_read(WRAM_END_FILL_BYTE)?.to_be_bytes();
        self.end_fill_byte = fill;
        self.log
            .debug(format_args!("endFillByte is {:X}", self.end_fill_byte));
        self.timing.delay_ms(100);

        self.detect_family()
    }

    /// Communication self-test: walk SCI_VOL through `0..0xFFFF` in
    /// `step` increments, reading every value back twice.
    ///
    /// Returns the number of mismatches; stops early after
    /// `self_test_max_errors` of them.
    fn self_test(&mut self, step: u16, header: &str) -> Result<u16, Error<B::Error>> {
        self.timing.delay_ms(100);
        if self.dreq.is_low().map_err(Error::pin)? {
            self.log.warn(format_args!("not properly installed!"));
            return Err(Error::NotConnected);
        }
        self.log.debug(format_args!("{header}"));

        let step = u32::from(step.max(1));
        let mut errors = 0u16;
        let mut value = 0u32;
        while let Ok(word) = u16::try_from(value) {
            if word == u16::MAX || errors >= self.config.self_test_max_errors {
                break;
            }
            self.write_register(Register::Vol, word)?;
            let r1 = self.read_register(Register::Vol)?;
            let r2 = self.read_register(Register::Vol)?;
            if r1 != r2 || r1 != word {
                self.log.warn(format_args!(
                    "error retry SB:{word:04X} R1:{r1:04X} R2:{r2:04X}"
                ));
                errors = errors.saturating_add(1);
                self.timing.delay_ms(10);
            }
            self.timing.yield_now();
            value = value.saturating_add(step);
        }
        Ok(errors)
    }

    /// Read SCI_STATUS once and cache the version and family.
    fn detect_family(&mut self) -> Result<(), Error<B::Error>> {
        let status = self.read_register(Register::Status)?;
        if status == 0x0000 || status == 0xFFFF {
            self.log
                .warn(format_args!("status register reads {status:#06X}"));
            return Err(Error::NotConnected);
        }
        let version = status_version(status);
        self.version = Some(version);
        match ChipFamily::from_version(version) {
            Some(family) => {
                self.log
                    .info(format_args!("{} ({version})", family.name()));
                self.family = Some(family);
            }
            None => {
                self.log
                    .info(format_args!("Unsupported chip: ({version})"));
            }
        }
        Ok(())
    }

    /// Family cached by the last [`Vs10xx::begin`].
    pub(crate) fn require_family(&self) -> Result<ChipFamily, Error<B::Error>> {
        match (self.family, self.version) {
            (Some(family), _) => Ok(family),
            (None, Some(version)) => Err(Error::UnsupportedChip { version }),
            (None, None) => Err(Error::NotInitialized),
        }
    }

    fn firmware(&self, slot: FirmwareSlot) -> Result<&'static [u16], Error<B::Error>> {
        self.config
            .firmware
            .get(slot)
            .ok_or(Error::MissingFirmware(slot))
    }

    // -----------------------------------------------------------------------
    // Modes
    // -----------------------------------------------------------------------

    /// Initialize for compressed-audio playback.
    ///
    /// Primes the decoder with fillers, forces MP3 mode on boards that
    /// boot into MIDI and, on VS1053, applies the generic patch when one is
    /// configured and [`DriverConfig::load_default_patches`] is set. Chips
    /// outside the known families still enter [`Mode::Output`].
    pub fn begin_output(&mut self) -> Result<(), Error<B::Error>> {
        self.begin()?;
        self.mode = Mode::Output;
        self.start_song()?;
        self.switch_to_mp3_mode()?;
        if self.family == Some(ChipFamily::Vs1053) && self.config.load_default_patches {
            self.load_default_patches()?;
        }
        Ok(())
    }

    /// Initialize and start the realtime MIDI plugin.
    ///
    /// The mode only becomes [`Mode::Midi`] once SCI_AUDATA reads back
    /// 0xAC45.
    pub fn begin_midi(&mut self) -> Result<(), Error<B::Error>> {
        self.log.info(format_args!("beginMIDI"));
        self.begin()?;
        self.wait_dreq()?;

        let family = self.require_family()?;
        let (slot, entry) = match family {
            ChipFamily::Vs1003 => (FirmwareSlot::MidiVs1003, AIADDR_MIDI_VS1003),
            ChipFamily::Vs1053 => (FirmwareSlot::MidiVs1053, AIADDR_MIDI_VS1053),
        };
        let table = self.firmware(slot)?;
        self.load_user_code(table)?;
        self.write_register(Register::AiAddr, entry)?;
        self.log
            .debug(format_args!("MIDI plugin {} loaded", family.name()));

        self.timing.delay_ms(500);
        let audata = self.read_register(Register::AuData)?;
        if audata == AUDATA_MIDI_ACTIVE {
            self.mode = Mode::Midi;
            self.log.info(format_args!("Midi active"));
            Ok(())
        } else {
            self.log.info(format_args!("Midi inactive"));
            Err(Error::MidiInactive { audata })
        }
    }

    /// Initialize and start PCM capture.
    ///
    /// On VS1003 the requested rate is matched by the clock solver and
    /// `options` is updated with the rate actually achieved.
    pub fn begin_input(&mut self, options: &mut RecordingOptions) -> Result<(), Error<B::Error>> {
        self.log.info(format_args!("beginInput"));
        self.begin()?;
        match self.require_family()? {
            ChipFamily::Vs1003 => self.begin_input_vs1003(options)?,
            ChipFamily::Vs1053 => self.begin_input_vs1053(options)?,
        }
        self.mode = Mode::Input;
        Ok(())
    }

    fn begin_input_vs1003(&mut self, options: &mut RecordingOptions) -> Result<(), Error<B::Error>> {
        self.log.debug(format_args!("begin_input_vs1003"));
        self.channel_multiplier = options.channels();

        let table = self.firmware(FirmwareSlot::PcmVs1003)?;
        self.load_user_code(table)?;
        self.timing.delay_ms(100);

        let requested = options.sample_rate().get();
        let Some(solution) = ClockSolver::new(self.config.xtal_hz).solve(requested) else {
            self.log
                .debug(format_args!("Could not set sample rate {requested}"));
            return Err(Error::SampleRateUnreachable { requested });
        };
        let clock_freq = self.read_register(Register::ClockF)? & CLOCKF_FREQ_MASK;
        let clockf = clock_freq | solution.clockf_bits();
        self.log.debug(format_args!(
            "SCI_CLOCKF: {clockf:x} divider: {} sample_rate: {requested} eff: {}",
            solution.divider, solution.rate_hz
        ));

        self.write_register(Register::ClockF, clockf)?;
        self.timing.delay_ms(100);
        self.write_register(Register::AiCtrl0, solution.divider)?;
        self.timing.delay_ms(100);
        self.write_register(Register::AiCtrl1, options.gain())?;
        self.timing.delay_ms(100);

        let mut mode = self.read_register(Register::Mode)?;
        mode |= SM_ADPCM;
        mode = set_flag(mode, SM_LINE1, options.input() == InputSource::Aux);
        self.write_register(Register::Mode, mode)?;
        self.timing.delay_ms(100);

        self.write_register(Register::AiAddr, AIADDR_PCM_VS1003)?;
        self.timing.delay_ms(100);

        options.set_effective_rate(solution.rate_hz);
        Ok(())
    }

    fn begin_input_vs1053(&mut self, options: &RecordingOptions) -> Result<(), Error<B::Error>> {
        self.log.debug(format_args!("begin_input_vs1053"));
        let table = self.firmware(FirmwareSlot::PcmVs1053)?;
        self.channel_multiplier = 1;

        let rate = u16::try_from(options.sample_rate().get()).unwrap_or(u16::MAX);
        self.write_register(Register::AiCtrl0, rate)?;
        self.write_register(Register::AiCtrl1, options.gain())?;
        self.write_register(Register::AiCtrl2, options.autogain())?;
        self.write_register(Register::AiCtrl3, options.aictrl3())?;

        let mut mode = self.read_register(Register::Mode)?;
        mode |= SM_ADPCM | SM_RESET;
        mode = set_flag(mode, SM_LINE1, options.input() == InputSource::Aux);
        self.write_register(Register::Mode, mode)?;

        self.load_user_code(table)?;

        if !options.keep_wav_header() {
            self.skip_wav_header()?;
        }
        Ok(())
    }

    /// Wait (bounded) for the plugin's WAV header and drop it.
    fn skip_wav_header(&mut self) -> Result<(), Error<B::Error>> {
        let header_words = u16::try_from(WAV_HEADER_BYTES / 2).unwrap_or(u16::MAX);
        let mut ready = false;
        for _ in 0..HEADER_WAIT_ROUNDS {
            if self.read_register(Register::HDat1)? >= header_words {
                ready = true;
                break;
            }
            self.timing.delay_ms(1);
            self.timing.yield_now();
        }
        if !ready {
            self.log
                .warn(format_args!("WAV header not available, dropping anyway"));
        }
        for _ in 0..header_words {
            self.read_register(Register::HDat0)?;
        }
        Ok(())
    }

    /// Stop recording: clear SM_ADPCM and soft-reset.
    pub fn end(&mut self) -> Result<(), Error<B::Error>> {
        let mode = self.read_register(Register::Mode)?;
        self.write_register(Register::Mode, mode & !SM_ADPCM)?;
        self.soft_reset()?;
        self.mode = Mode::NotActive;
        self.channel_multiplier = 1;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Resets
    // -----------------------------------------------------------------------

    /// SM_RESET with SM_SDINEW kept, then wait for DREQ.
    pub fn soft_reset(&mut self) -> Result<(), Error<B::Error>> {
        self.log.info(format_args!("Performing soft-reset"));
        self.write_register(Register::Mode, SM_SDINEW | SM_RESET)?;
        self.timing.delay_ms(10);
        self.wait_dreq()
    }

    /// Pulse XRESET low for 500 ms.
    pub fn hard_reset(&mut self) -> Result<(), Error<B::Error>> {
        let Some(reset) = self.reset.as_mut() else {
            self.log.error(format_args!(
                "hard-reset only supported when reset_pin is defined"
            ));
            return Err(Error::NoResetPin);
        };
        self.log.info(format_args!("Performing hard-reset"));
        reset.set_low().map_err(Error::pin)?;
        self.timing.delay_ms(500);
        reset.set_high().map_err(Error::pin)
    }

    pub(crate) fn wrong_mode(&self, expected: Mode) -> Error<B::Error> {
        Error::WrongMode {
            expected,
            actual: self.mode,
        }
    }
}

/// SCI_HDAT1 polls while waiting for the WAV header.
const HEADER_WAIT_ROUNDS: usize = 100;

pub(crate) const fn set_flag(value: u16, flag: u16, active: bool) -> u16 {
    if active {
        value | flag
    } else {
        value & !flag
    }
}

impl<B, CS, DCS, DREQ, T, RST, S> platform::AudioCodec for Vs10xx<B, CS, DCS, DREQ, T, RST, S>
where
    B: ControlBus,
    CS: OutputPin,
    DCS: OutputPin,
    DREQ: InputPin,
    T: Timing,
    RST: OutputPin,
    S: LogSink,
{
    type Error = Error<B::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.begin_output()
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        self.start_song()
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.stop_song()
    }

    fn set_volume(&mut self, volume: VolumePercent) -> Result<(), Self::Error> {
        Vs10xx::set_volume(self, volume)
    }

    fn write_audio(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        Vs10xx::write_audio(self, data)
    }
}
