//! Cortex-M implementations: SysTick as the tick timer and a cycle-counted
//! delay.
//!
//! The handler lives in a `static` [`TickSlot`](crate::slot::TickSlot). The
//! `SysTick` exception handler of the application forwards to
//! [`dispatch`](crate::slot::dispatch):
//!
//! ```rust,ignore
//! static TICK: TickSlot<MyHandler> = empty_slot();
//!
//! #[exception]
//! fn SysTick() {
//!     wdt_hal::slot::dispatch(&TICK);
//! }
//! ```

use cortex_m::peripheral::SYST;
use cortex_m::peripheral::syst::SystClkSource;
use embedded_hal::delay::DelayNs;

use crate::delay::CycleDelay;
use crate::slot::{PeriodicTimer, SlotTickSource};
use crate::tick::counter_reload;

/// SysTick clocked from the core clock.
pub struct SysTick {
    syst: SYST,
}

impl core::fmt::Debug for SysTick {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SysTick").finish_non_exhaustive()
    }
}

impl SysTick {
    /// Take ownership of SysTick.
    pub fn new(syst: SYST) -> Self {
        Self { syst }
    }

    /// Stop the counter and give SysTick back.
    pub fn free(mut self) -> SYST {
        self.syst.disable_interrupt();
        self.syst.disable_counter();
        self.syst
    }
}

impl PeriodicTimer for SysTick {
    fn start_periodic(&mut self, reload: u32) {
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(counter_reload(reload));
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
    }
}

/// SysTick-driven [`TickSource`](crate::TickSource).
pub type SysTickSource<H> = SlotTickSource<SysTick, H>;

/// [`DelayNs`] backed by `cortex_m::asm::delay`.
#[derive(Debug, Clone, Copy)]
pub struct AsmDelay {
    cycles: CycleDelay,
}

impl AsmDelay {
    /// Delay for a core running at `core_clock_hz`.
    #[must_use]
    pub const fn new(core_clock_hz: u32) -> Self {
        Self {
            cycles: CycleDelay::new(core_clock_hz),
        }
    }
}

impl DelayNs for AsmDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut remaining = self.cycles.cycles_for_ns(ns);
        while remaining > 0 {
            let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
            cortex_m::asm::delay(chunk);
            remaining = remaining.saturating_sub(u64::from(chunk));
        }
    }
}
