//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `VolumePercent`: clamps 0–100, prevents register overflow
//! - `Balance`: clamps -100..=100 (negative favours the left channel)
//! - `SampleRateHz`: validates the 8000–48000 Hz capture range

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: i64,
    /// The inclusive minimum allowed value.
    pub min: i64,
    /// The inclusive maximum allowed value.
    pub max: i64,
}

// ── VolumePercent ────────────────────────────────────────────────────────────

/// Volume as a percentage, clamped to 0–100.
///
/// Wraps a `u8` with the invariant `0 <= value <= 100`.
/// Construct with [`VolumePercent::new`] (clamping) or
/// [`VolumePercent::try_new`] (fallible, strict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Loudest setting.
    pub const MAX: Self = Self(100);

    /// Create a `VolumePercent`, clamping values above 100 to 100.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Create a `VolumePercent`, returning an error if `value > 100`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `value > 100`.
    pub fn try_new(value: u8) -> Result<Self, OutOfRangeError> {
        if value > 100 {
            Err(OutOfRangeError {
                value: i64::from(value),
                min: 0,
                max: 100,
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Return the inner volume value (0–100).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── Balance ──────────────────────────────────────────────────────────────────

/// Left/right balance, clamped to -100..=100.
///
/// `-100` silences the right channel, `100` silences the left channel and
/// `0` leaves both at the master volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Balance(i8);

impl Balance {
    /// Both channels at the master volume.
    pub const CENTER: Self = Self(0);

    /// Create a `Balance`, clamping to -100..=100.
    #[must_use]
    pub fn new(value: i8) -> Self {
        Self(value.clamp(-100, 100))
    }

    /// Return the inner balance value (-100..=100).
    #[must_use]
    pub fn get(self) -> i8 {
        self.0
    }

    /// Per-channel volume `(left, right)` after applying this balance to `volume`.
    ///
    /// The favoured channel keeps the master volume; the other one is reduced
    /// by the balance magnitude, saturating at 0.
    #[must_use]
    pub fn apply(self, volume: VolumePercent) -> (VolumePercent, VolumePercent) {
        let master = volume.get();
        let reduce = self.0.unsigned_abs();
        let reduced = VolumePercent::new(master.saturating_sub(reduce));
        match self.0 {
            b if b < 0 => (volume, reduced),
            b if b > 0 => (reduced, volume),
            _ => (volume, volume),
        }
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Capture sample rate in Hz, limited to what the VS10xx encoders accept.
///
/// Valid range: 8000–48000 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 48000 Hz.
    pub const MAX_HZ: u32 = 48_000;

    /// Create a `SampleRateHz`, returning an error if out of 8000–48000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 48000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: i64::from(hz),
                min: i64::from(Self::MIN_HZ),
                max: i64::from(Self::MAX_HZ),
            })
        }
    }

    /// Create a `SampleRateHz`, clamping into 8000–48000 Hz.
    #[must_use]
    pub fn clamped(hz: u32) -> Self {
        Self(hz.clamp(Self::MIN_HZ, Self::MAX_HZ))
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for SampleRateHz {
    fn default() -> Self {
        Self(Self::MIN_HZ)
    }
}
