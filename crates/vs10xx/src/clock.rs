//! VS1003 recording clock solver
//!
//! On the VS1003 the ADPCM/PCM encoder rate is derived from the internal
//! clock:
//!
//! ```text
//! fs = SC_MULT × XTALI / 256 / SCI_AICTRL0
//! ```
//!
//! SC_MULT is one of seven multipliers (2.0–5.0 in 0.5 steps, SCI_CLOCKF
//! bits 15..13) and the divider in SCI_AICTRL0 is 4–126. The solver walks
//! that grid and picks the pair closest to the requested rate without
//! going below it.
//!
//! All arithmetic is integer: the multiplier is kept in half steps so
//! `fs = half × XTALI / 512 / divider`, truncated like the hardware does.

use core::ops::RangeInclusive;

/// Crystal frequency of the common VS1003 breakout boards, in Hz.
pub const DEFAULT_XTAL_HZ: u32 = 12_288_000;

/// Valid SCI_AICTRL0 dividers.
pub const DIVIDERS: RangeInclusive<u16> = 4..=126;

/// One SC_MULT setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Multiplier {
    /// Multiplier in half units (4 = 2.0×, 10 = 5.0×)
    pub halves: u8,
    /// SCI_CLOCKF bits for this multiplier
    pub register: u16,
}

/// SC_MULT settings tried by the solver, ascending.
pub const MULTIPLIERS: [Multiplier; 7] = [
    Multiplier { halves: 4, register: 0x2000 },
    Multiplier { halves: 5, register: 0x4000 },
    Multiplier { halves: 6, register: 0x6000 },
    Multiplier { halves: 7, register: 0x8000 },
    Multiplier { halves: 8, register: 0xA000 },
    Multiplier { halves: 9, register: 0xC000 },
    Multiplier { halves: 10, register: 0xE000 },
];

/// Result of [`ClockSolver::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSolution {
    /// Chosen multiplier
    pub multiplier: Multiplier,
    /// Value for SCI_AICTRL0
    pub divider: u16,
    /// Sample rate the pair actually produces, in Hz
    pub rate_hz: u32,
}

impl ClockSolution {
    /// SCI_CLOCKF bits for the multiplier.
    pub fn clockf_bits(&self) -> u16 {
        self.multiplier.register
    }

    /// |achieved − requested|
    pub fn error_hz(&self, requested: u32) -> u32 {
        self.rate_hz.abs_diff(requested)
    }
}

/// Multiplier/divider search for a given crystal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSolver {
    xtal_hz: u32,
}

impl Default for ClockSolver {
    fn default() -> Self {
        Self::new(DEFAULT_XTAL_HZ)
    }
}

impl ClockSolver {
    /// Solver for a crystal of `xtal_hz`.
    pub const fn new(xtal_hz: u32) -> Self {
        Self { xtal_hz }
    }

    /// Crystal frequency in Hz.
    pub fn xtal_hz(&self) -> u32 {
        self.xtal_hz
    }

    /// Sample rate produced by `multiplier` and `divider`.
    pub fn rate(&self, multiplier: Multiplier, divider: u16) -> u32 {
        let scaled = u64::from(self.xtal_hz).saturating_mul(u64::from(multiplier.halves));
        let rate = scaled
            .checked_div(512u64.saturating_mul(u64::from(divider)))
            .unwrap_or(0);
        u32::try_from(rate).unwrap_or(u32::MAX)
    }

    /// Best pair for `target_hz`, or `None` if no pair gets closer than
    /// `target_hz` itself.
    ///
    /// For each multiplier the dividers are scanned upwards until the rate
    /// drops below the target. An exact hit ends the search.
    pub fn solve(&self, target_hz: u32) -> Option<ClockSolution> {
        let mut best: Option<ClockSolution> = None;
        let mut best_diff = target_hz;

        for multiplier in MULTIPLIERS {
            for divider in DIVIDERS {
                let rate_hz = self.rate(multiplier, divider);
                if rate_hz < target_hz {
                    break;
                }
                let diff = rate_hz.abs_diff(target_hz);
                if diff < best_diff {
                    best_diff = diff;
                    best = Some(ClockSolution {
                        multiplier,
                        divider,
                        rate_hz,
                    });
                }
                if diff == 0 {
                    return best;
                }
            }
        }
        best
    }
}
