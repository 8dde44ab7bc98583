//! Mock implementations for testing
//!
//! This module provides mock implementations of the platform capabilities
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]

use embedded_hal::delay::DelayNs;

use crate::Timing;

/// Mock timing: never sleeps, only accounts.
#[derive(Debug, Clone, Default)]
pub struct MockTiming {
    elapsed_ns: u64,
    delays: usize,
    yields: usize,
}

impl MockTiming {
    /// Create new mock timing
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requested delay in milliseconds (rounded down)
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }

    /// Number of delay calls
    pub fn delay_count(&self) -> usize {
        self.delays
    }

    /// Number of cooperative yields
    pub fn yield_count(&self) -> usize {
        self.yields
    }
}

impl DelayNs for MockTiming {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns = self.elapsed_ns.saturating_add(u64::from(ns));
        self.delays = self.delays.saturating_add(1);
    }
}

impl Timing for MockTiming {
    fn yield_now(&mut self) {
        self.yields = self.yields.saturating_add(1);
    }
}
