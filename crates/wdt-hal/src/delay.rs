//! Calibrated busy-wait delay.
//!
//! Diagnostic blinking uses a busy wait rather than a timer so that it keeps
//! working when nothing but the core clock can be trusted. The delay is
//! expressed in time and converted to loop iterations from the core clock and
//! a documented cycles-per-iteration figure, so the blink rate does not depend
//! on how a particular compiler lays out an empty loop.

use embedded_hal::delay::DelayNs;

/// Core cycles consumed by one iteration of the spin loop in [`CycleDelay`]
/// (spin hint, decrement, compare, taken branch on a Cortex-M4 at `opt-level = "s"`).
pub const SPIN_CYCLES_PER_ITERATION: u32 = 4;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Busy-wait [`DelayNs`] derived from the core clock frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDelay {
    core_clock_hz: u32,
    cycles_per_iteration: u32,
}

impl CycleDelay {
    /// Delay calibrated with [`SPIN_CYCLES_PER_ITERATION`].
    #[must_use]
    pub const fn new(core_clock_hz: u32) -> Self {
        Self::with_cycles_per_iteration(core_clock_hz, SPIN_CYCLES_PER_ITERATION)
    }

    /// Delay calibrated with a measured cycles-per-iteration figure.
    ///
    /// A figure of zero is treated as one.
    #[must_use]
    pub const fn with_cycles_per_iteration(core_clock_hz: u32, cycles_per_iteration: u32) -> Self {
        let cycles_per_iteration = if cycles_per_iteration == 0 {
            1
        } else {
            cycles_per_iteration
        };
        Self {
            core_clock_hz,
            cycles_per_iteration,
        }
    }

    /// Core clock frequency this delay was calibrated for.
    #[must_use]
    pub const fn core_clock_hz(&self) -> u32 {
        self.core_clock_hz
    }

    /// Core cycles needed to cover `ns` nanoseconds, rounded up.
    #[must_use]
    pub fn cycles_for_ns(&self, ns: u32) -> u64 {
        (u64::from(ns) * u64::from(self.core_clock_hz)).div_ceil(NANOS_PER_SECOND)
    }

    /// Spin-loop iterations needed to cover `ns` nanoseconds, rounded up.
    #[must_use]
    pub fn iterations_for_ns(&self, ns: u32) -> u64 {
        self.cycles_for_ns(ns)
            .div_ceil(u64::from(self.cycles_per_iteration))
    }
}

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        for _ in 0..self.iterations_for_ns(ns) {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_for_ns() {
        let delay = CycleDelay::new(144_000_000);
        assert_eq!(delay.cycles_for_ns(1_000), 144);
        assert_eq!(delay.cycles_for_ns(1), 1);
        assert_eq!(delay.cycles_for_ns(0), 0);
    }

    #[test]
    fn test_iterations_round_up() {
        let delay = CycleDelay::new(144_000_000);
        assert_eq!(delay.iterations_for_ns(1_000), 36);
        let delay = CycleDelay::with_cycles_per_iteration(1_000_000_000, 3);
        assert_eq!(delay.iterations_for_ns(10), 4);
    }

    #[test]
    fn test_zero_cycles_per_iteration_is_clamped() {
        let delay = CycleDelay::with_cycles_per_iteration(1_000_000, 0);
        assert_eq!(delay.iterations_for_ns(1_000), 1);
    }

    #[test]
    fn test_delay_runs() {
        let mut delay = CycleDelay::new(1_000_000);
        delay.delay_us(10);
        assert_eq!(delay.core_clock_hz(), 1_000_000);
    }
}
