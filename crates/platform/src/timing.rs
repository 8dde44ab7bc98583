//! Delays and cooperative yield

use embedded_hal::delay::DelayNs;

/// Host timing services.
///
/// Every busy-poll in the driver calls [`Timing::yield_now`] once per
/// iteration, so cooperative schedulers (RTOS idle hooks, watchdog feeders,
/// single-core Wi-Fi stacks) keep running while the codec holds DREQ low.
pub trait Timing: DelayNs {
    /// Give other tasks a chance to run.
    fn yield_now(&mut self) {
        core::hint::spin_loop();
    }
}

impl<T: Timing + ?Sized> Timing for &mut T {
    fn yield_now(&mut self) {
        (**self).yield_now();
    }
}

/// [`Timing`] backed by `std::thread`.
#[cfg(any(test, feature = "std"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTiming;

#[cfg(any(test, feature = "std"))]
impl DelayNs for StdTiming {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(core::time::Duration::from_nanos(u64::from(ns)));
    }
}

#[cfg(any(test, feature = "std"))]
impl Timing for StdTiming {
    fn yield_now(&mut self) {
        std::thread::yield_now();
    }
}
