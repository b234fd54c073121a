//! Periodic tick interrupt.
//!
//! Exactly one tick source drives exactly one handler. Invocations are
//! serialized by hardware: each one completes before the next can fire, and
//! a handler is never re-entered.

/// Work performed once per tick interrupt.
///
/// # Real-Time Safety
///
/// Runs in interrupt context: no allocation, no blocking, bounded time.
pub trait TickHandler {
    /// Handle one tick.
    fn handle_tick(&mut self);
}

impl<H: TickHandler + ?Sized> TickHandler for &mut H {
    fn handle_tick(&mut self) {
        (**self).handle_tick();
    }
}

/// A periodic interrupt source.
///
/// The firing rate is fixed once through a clock-divisor reload value
/// (`core clock / ticks per second`). Once armed, the source runs for the rest
/// of the process lifetime; there is no disarm.
pub trait TickSource<H: TickHandler> {
    /// Install `handler` and start firing every `reload` core-clock cycles.
    ///
    /// The handler is installed before the counter is enabled, so the first
    /// interrupt always finds it in place.
    fn arm(&mut self, reload: u32, handler: H);
}

/// Maximum reload value of a 24-bit down-counter such as SysTick.
pub const MAX_TICK_RELOAD: u32 = 0x00FF_FFFF;

/// Compute the reload value for `ticks_per_second` on a `core_clock_hz` clock.
///
/// Returns `None` when the rate is zero or faster than the core clock.
#[must_use]
pub const fn reload_for(core_clock_hz: u32, ticks_per_second: u32) -> Option<u32> {
    if ticks_per_second == 0 || ticks_per_second > core_clock_hz {
        return None;
    }
    Some(core_clock_hz / ticks_per_second)
}

/// Value to program into a wrap-around down-counter so that it fires every
/// `reload` cycles.
///
/// The counter wraps after `register + 1` cycles, so the register holds
/// `reload - 1`. `reload` is clamped to `1..=MAX_TICK_RELOAD + 1`.
#[must_use]
pub const fn counter_reload(reload: u32) -> u32 {
    if reload == 0 {
        0
    } else if reload > MAX_TICK_RELOAD {
        MAX_TICK_RELOAD
    } else {
        reload - 1
    }
}
