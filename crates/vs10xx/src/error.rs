//! Driver error types

use core::fmt::Debug;

use embedded_hal::digital::ErrorKind;
use thiserror_no_std::Error;

use crate::chip::Mode;
use crate::config::FirmwareSlot;

/// A patch table that cannot be decoded into complete records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatchError {
    /// The table ends in the middle of the record starting at `offset`.
    #[error("patch table truncated in record at word {offset}")]
    Truncated {
        /// Word index of the incomplete record
        offset: usize,
    },
    /// The record at `offset` targets an address outside the SCI register file.
    #[error("patch record at word {offset} targets address {address:#06X}")]
    AddressOutOfRange {
        /// Word index of the offending record
        offset: usize,
        /// Address word found in the table
        address: u16,
    },
}

/// Errors returned by [`crate::Vs10xx`].
///
/// `BE` is the error type of the [`platform::ControlBus`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error<BE: Debug> {
    /// Bus transfer failed
    #[error("bus error: {0:?}")]
    Bus(BE),
    /// Chip select, data select, reset or DREQ pin failed
    #[error("pin error: {0:?}")]
    Pin(ErrorKind),
    /// DREQ stayed low at startup or the status register reads 0x0000/0xFFFF
    #[error("no chip answering on the control link")]
    NotConnected,
    /// Status register reports a chip outside the VS1003/VS1053 families
    #[error("unsupported chip version {version}")]
    UnsupportedChip {
        /// SS_VER field of SCI_STATUS
        version: u8,
    },
    /// The chip family is needed but the chip was never initialized
    #[error("chip not initialized")]
    NotInitialized,
    /// A plugin needed for the requested mode was not supplied
    #[error("firmware table {0:?} not configured")]
    MissingFirmware(FirmwareSlot),
    /// A patch table is malformed
    #[error("malformed patch: {0}")]
    Patch(#[from] PatchError),
    /// The VS1003 clock solver found no multiplier/divider pair
    #[error("sample rate {requested} Hz not reachable")]
    SampleRateUnreachable {
        /// Requested rate in Hz
        requested: u32,
    },
    /// The realtime MIDI plugin did not start
    #[error("MIDI plugin inactive (SCI_AUDATA = {audata:#06X})")]
    MidiInactive {
        /// SCI_AUDATA value read back after starting the plugin
        audata: u16,
    },
    /// SM_CANCEL was never cleared by the decoder
    #[error("decoder did not acknowledge cancel")]
    CancelTimeout,
    /// Hard reset requested without a reset pin
    #[error("hard reset needs a reset pin")]
    NoResetPin,
    /// A transaction was opened while another one was still active
    #[error("nested bus transaction")]
    NestedTransaction,
    /// The operation needs another operating mode
    #[error("operation needs {expected:?} mode, device is in {actual:?}")]
    WrongMode {
        /// Mode the operation requires
        expected: Mode,
        /// Current mode
        actual: Mode,
    },
}

impl<BE: Debug> Error<BE> {
    /// Map any `embedded_hal` pin error to [`Error::Pin`].
    pub(crate) fn pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        Error::Pin(err.kind())
    }
}
