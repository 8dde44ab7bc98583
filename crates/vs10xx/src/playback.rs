//! Playback controls: stream framing, volume, tone and output routing

use embedded_hal::digital::{InputPin, OutputPin};
use platform::{Balance, ControlBus, LogSink, Timing, VolumePercent};

use crate::chip::{ddr_with_i2s, ddr_without_i2s, status_version, ChipFamily, EarSpeaker, I2sRate, Mode};
use crate::driver::Vs10xx;
use crate::equalizer::{tone_word, Equalizer};
use crate::error::Error;
use crate::midi;
use crate::patch::PatchProgram;
use crate::registers::{
    Register, GPIO_DDR, GPIO_ODATA, I2S_CONFIG, SM_CANCEL, SM_SDINEW, SM_STREAM,
    WRAM_OLD_CLOCK_4KHZ, WRAM_RATE_TUNE,
};
use crate::volume::volume_word;

/// Fillers sent by `start_song`.
const START_FILLERS: usize = 10;
/// Fillers that flush the whole stream buffer (2048 + 4 bytes).
const FLUSH_FILLERS: usize = 2052;
/// Fillers sent per cancel poll.
const CANCEL_FILLERS: usize = 32;
/// Cancel polls before giving up.
const CANCEL_ROUNDS: u32 = 200;

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
    // -----------------------------------------------------------------------
    // Stream
    // -----------------------------------------------------------------------

    /// Prime the decoder for a new stream.
    pub fn start_song(&mut self) -> Result<(), Error<B::Error>> {
        self.send_fillers(START_FILLERS)
    }

    /// Send encoded audio.
    ///
    /// In MIDI mode each byte is padded to a 16-bit word for the plugin's
    /// sample path. Fails with [`Error::WrongMode`] (and no bus traffic)
    /// unless the device is in [`Mode::Output`] or [`Mode::Midi`].
    pub fn write_audio(&mut self, data: &[u8]) -> Result<(), Error<B::Error>> {
        match self.mode {
            Mode::Output => self.send_buffer(data),
            Mode::Midi => self.send_padded(data),
            Mode::NotActive | Mode::Input => Err(self.wrong_mode(Mode::Output)),
        }
    }

    /// Same as [`Vs10xx::write_audio`].
    pub fn play_chunk(&mut self, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.write_audio(data)
    }

    /// Flush and cancel the current stream.
    ///
    /// Sends 2052 fillers, sets SM_CANCEL and keeps feeding fillers until
    /// the decoder clears it. If it never does, the registers are dumped to
    /// the log and [`Error::CancelTimeout`] is returned.
    pub fn stop_song(&mut self) -> Result<(), Error<B::Error>> {
        self.send_fillers(FLUSH_FILLERS)?;
        self.timing.delay_ms(10);
        self.write_register(Register::Mode, SM_SDINEW | SM_CANCEL)?;
        for round in 0..CANCEL_ROUNDS {
            self.send_fillers(CANCEL_FILLERS)?;
            let mode = self.read_register(Register::Mode)?;
            if mode & SM_CANCEL == 0 {
                self.send_fillers(FLUSH_FILLERS)?;
                self.log.info(format_args!(
                    "Song stopped correctly after {} msec",
                    round.saturating_mul(10)
                ));
                return Ok(());
            }
            self.timing.delay_ms(10);
        }
        self.print_details("Song stopped incorrectly!")?;
        Err(Error::CancelTimeout)
    }

    /// Enable SM_STREAM (adaptive playback speed for network streams).
    pub fn stream_mode_on(&mut self) -> Result<(), Error<B::Error>> {
        self.log.info(format_args!("Performing streamModeOn"));
        self.write_register(Register::Mode, SM_SDINEW | SM_STREAM)?;
        self.timing.delay_ms(10);
        self.wait_dreq()
    }

    /// Disable SM_STREAM.
    pub fn stream_mode_off(&mut self) -> Result<(), Error<B::Error>> {
        self.log.info(format_args!("Performing streamModeOff"));
        self.write_register(Register::Mode, SM_SDINEW)?;
        self.timing.delay_ms(10);
        self.wait_dreq()
    }

    /// Drive GPIO0/1 low and soft-reset; boards that strap GPIO for MIDI
    /// boot then come up in MP3 mode. Harmless on other boards.
    pub fn switch_to_mp3_mode(&mut self) -> Result<(), Error<B::Error>> {
        self.wram_write(GPIO_DDR, 3)?;
        self.wram_write(GPIO_ODATA, 0)?;
        self.timing.delay_ms(100);
        self.log.info(format_args!("Switched to mp3 mode"));
        self.soft_reset()
    }

    // -----------------------------------------------------------------------
    // MIDI
    // -----------------------------------------------------------------------

    /// Send a channel message to the realtime MIDI plugin.
    ///
    /// Outside [`Mode::Midi`] this logs one warning and sends nothing.
    pub fn send_midi_message(
        &mut self,
        command: u8,
        data1: u8,
        data2: u8,
    ) -> Result<(), Error<B::Error>> {
        if self.mode != Mode::Midi {
            self.log.warn(format_args!("beginMidi not called"));
            return Ok(());
        }
        let frame = midi::frame(command, data1, data2);
        self.send_buffer(&frame)
    }

    // -----------------------------------------------------------------------
    // Volume and tone
    // -----------------------------------------------------------------------

    /// Set the master volume and write SCI_VOL with the current balance.
    pub fn set_volume(&mut self, volume: VolumePercent) -> Result<(), Error<B::Error>> {
        self.volume = volume;
        let word = volume_word(volume, self.balance);
        self.write_register(Register::Vol, word)?;
        self.log.info(format_args!("setVolume: {word:x}"));
        Ok(())
    }

    /// Last volume set.
    pub fn volume(&self) -> VolumePercent {
        self.volume
    }

    /// Store the balance; it takes effect on the next [`Vs10xx::set_volume`].
    pub fn set_balance(&mut self, balance: Balance) {
        self.balance = balance;
    }

    /// Current balance.
    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Program SCI_BASS from four raw nibbles: treble amplitude, treble
    /// limit, bass amplitude, bass limit.
    pub fn set_tone(&mut self, nibbles: [u8; 4]) -> Result<(), Error<B::Error>> {
        self.write_register(Register::Bass, tone_word(nibbles))
    }

    /// Current equalizer settings.
    pub fn equalizer(&self) -> &Equalizer {
        &self.equalizer
    }

    /// Treble amplitude in percent.
    pub fn treble(&self) -> u8 {
        self.equalizer.treble.amplitude()
    }

    /// Set the treble amplitude (0–100 %).
    pub fn set_treble(&mut self, amplitude: u8) -> Result<(), Error<B::Error>> {
        self.equalizer.treble.set_amplitude(amplitude);
        self.write_equalizer()
    }

    /// Bass amplitude in percent.
    pub fn bass(&self) -> u8 {
        self.equalizer.bass.amplitude()
    }

    /// Set the bass amplitude (0–100 %).
    pub fn set_bass(&mut self, amplitude: u8) -> Result<(), Error<B::Error>> {
        self.equalizer.bass.set_amplitude(amplitude);
        self.write_equalizer()
    }

    /// Set the treble lower frequency limit (0–15000 Hz).
    pub fn set_treble_frequency_limit(&mut self, hz: u16) -> Result<(), Error<B::Error>> {
        self.equalizer.treble.set_freq_limit_hz(hz);
        self.write_equalizer()
    }

    /// Set the bass upper frequency limit (0–15000 Hz).
    pub fn set_bass_frequency_limit(&mut self, hz: u16) -> Result<(), Error<B::Error>> {
        self.equalizer.bass.set_freq_limit_hz(hz);
        self.write_equalizer()
    }

    fn write_equalizer(&mut self) -> Result<(), Error<B::Error>> {
        self.write_register(Register::Bass, self.equalizer.value())
    }

    /// Select the EarSpeaker level (VS1053 only).
    pub fn set_ear_speaker(&mut self, level: EarSpeaker) -> Result<(), Error<B::Error>> {
        let supported = match self.require_family() {
            Ok(ChipFamily::Vs1053) => Ok(()),
            Ok(ChipFamily::Vs1003) => Err(Error::UnsupportedChip {
                version: self.version.unwrap_or(0),
            }),
            Err(err) => Err(err),
        };
        if let Err(err) = supported {
            self.log.error(format_args!("Function not supported"));
            return Err(err);
        }
        let mode = self.read_register(Register::Mode)?;
        self.write_register(Register::Mode, level.apply(mode))
    }

    // -----------------------------------------------------------------------
    // I2S
    // -----------------------------------------------------------------------

    /// Route decoded audio to the I2S pins (GPIO4–7) at `rate`.
    pub fn enable_i2s_out(&mut self, rate: I2sRate) -> Result<(), Error<B::Error>> {
        let ddr = self.wram_read(GPIO_DDR)?;
        self.wram_write(GPIO_DDR, ddr_with_i2s(ddr))?;
        self.wram_write(I2S_CONFIG, rate.config())
    }

    /// Turn I2S off and return GPIO4–7 to inputs.
    pub fn disable_i2s_out(&mut self) -> Result<(), Error<B::Error>> {
        self.wram_write(I2S_CONFIG, 0x0000)?;
        let ddr = self.wram_read(GPIO_DDR)?;
        self.wram_write(GPIO_DDR, ddr_without_i2s(ddr))
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Cheap wiring check: SCI_STATUS must not read 0x0000 or 0xFFFF.
    pub fn is_chip_connected(&mut self) -> Result<bool, Error<B::Error>> {
        let status = self.read_register(Register::Status)?;
        Ok(!(status == 0x0000 || status == 0xFFFF))
    }

    /// SS_VER field of SCI_STATUS (3 = VS1003, 4 = VS1053).
    pub fn chip_version(&mut self) -> Result<u8, Error<B::Error>> {
        Ok(status_version(self.read_register(Register::Status)?))
    }

    /// Decode time in whole seconds.
    pub fn decoded_time(&mut self) -> Result<u16, Error<B::Error>> {
        self.read_register(Register::DecodeTime)
    }

    /// Zero SCI_DECODE_TIME. Written twice so firmware cannot overwrite it.
    pub fn clear_decoded_time(&mut self) -> Result<(), Error<B::Error>> {
        self.write_register(Register::DecodeTime, 0x0000)?;
        self.write_register(Register::DecodeTime, 0x0000)
    }

    /// Fine-tune the playback rate by `ppm2` (units of 1/2 ppm).
    pub fn adjust_rate(&mut self, ppm2: i32) -> Result<(), Error<B::Error>> {
        let [b3, b2, b1, b0] = ppm2.to_be_bytes();
        self.write_register(Register::WramAddr, WRAM_RATE_TUNE)?;
        self.write_register(Register::Wram, u16::from_be_bytes([b1, b0]))?;
        self.write_register(Register::Wram, u16::from_be_bytes([b3, b2]))?;
        // oldClock4KHz = 0 forces the adjustment to be recalculated
        self.write_register(Register::WramAddr, WRAM_OLD_CLOCK_4KHZ)?;
        self.write_register(Register::Wram, 0)?;
        let audata = self.read_register(Register::AuData)?;
        self.write_register(Register::AuData, audata)
    }

    /// All 16 SCI registers in address order.
    pub fn read_registers(&mut self) -> Result<[u16; 16], Error<B::Error>> {
        let mut regs = [0u16; 16];
        for (slot, reg) in regs.iter_mut().zip(Register::ALL) {
            *slot = self.read_register(reg)?;
        }
        Ok(regs)
    }

    /// Log all 16 SCI registers at info level under `header`.
    pub fn print_details(&mut self, header: &str) -> Result<(), Error<B::Error>> {
        let regs = self.read_registers()?;
        self.log.info(format_args!("{header}"));
        self.log.info(format_args!("REG   Contents"));
        self.log.info(format_args!("---   -----"));
        for (reg, value) in Register::ALL.iter().zip(regs) {
            self.log
                .info(format_args!("{:3X} - {:5X}", reg.addr(), value));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Plugins
    // -----------------------------------------------------------------------

    /// Validate and upload a compressed plugin table.
    ///
    /// Nothing is written if the table is malformed.
    pub fn load_user_code(&mut self, table: &[u16]) -> Result<(), Error<B::Error>> {
        let program = PatchProgram::parse(table)?;
        self.log.info(format_args!("Loading User Code"));
        for (address, value) in program.writes() {
            self.write_register_raw(address, value)?;
        }
        self.log.debug(format_args!("User Code - done"));
        Ok(())
    }

    /// Upload the generic VS1053 patch set.
    ///
    /// Returns `Ok(false)` on other chips or when no table is configured.
    pub fn load_default_patches(&mut self) -> Result<bool, Error<B::Error>> {
        if self.require_family()? != ChipFamily::Vs1053 {
            return Ok(false);
        }
        let Some(table) = self.config.firmware.generic else {
            self.log.debug(format_args!("no generic patch configured"));
            return Ok(false);
        };
        self.log.debug(format_args!("loadDefaultVs1053Patches"));
        self.load_user_code(table)?;
        Ok(true)
    }
}
