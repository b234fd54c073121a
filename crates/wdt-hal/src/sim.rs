//! Simulated MCU for host tests and the `wdt-sim` binary.
//!
//! A [`SimBoard`] is a cloneable handle over one simulated device: a latched
//! reset-status register that survives resets, a windowed watchdog that
//! really expires, an indicator, a busy-wait delay that consumes simulated
//! time and a periodic tick source. Every hardware access is appended to a
//! journal of [`HardwareEvent`]s so tests can check what was touched, and in
//! which order.
//!
//! Simulated time only moves when a tick fires or a delay runs.
//!
//! # Example
//!
//! ```rust
//! use wdt_hal::prelude::*;
//! use wdt_hal::sim::{HardwareEvent, SimBoard};
//!
//! let board = SimBoard::power_on(WatchdogWindow::default());
//! let mut watchdog = board.watchdog();
//! watchdog.start();
//!
//! // Nobody services the watchdog: it expires at the upper bound.
//! assert!(board.advance_us(2_000_000));
//! board.watchdog_reset();
//! assert!(board.latched_cause().is_watchdog());
//! assert!(board.journal().contains(&HardwareEvent::WatchdogStarted));
//! ```

use std::sync::Arc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use parking_lot::Mutex;

use crate::board::{BoardSupport, BringUpError};
use crate::indicator::Indicator;
use crate::reset_cause::{ResetCause, ResetCauseRegister};
use crate::tick::{TickHandler, TickSource};
use crate::watchdog::{WatchdogDriver, WatchdogWindow};

const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// One recorded hardware access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareEvent {
    /// Board bring-up succeeded.
    BoardInitialised,
    /// The reset-status register was read.
    ResetCauseRead(ResetCause),
    /// The reset-status register was cleared.
    ResetCauseCleared,
    /// The watchdog clock source was selected.
    WatchdogClockSelected,
    /// The watchdog was started.
    WatchdogStarted,
    /// The watchdog was serviced.
    WatchdogServiced {
        /// Watchdog count at the time of the service call.
        count_ms: u32,
        /// Whether the service landed inside the window.
        accepted: bool,
    },
    /// The indicator changed level.
    IndicatorToggled {
        /// Level after the toggle.
        level: bool,
    },
    /// The periodic tick was armed.
    TickArmed {
        /// Reload value in core-clock cycles.
        reload: u32,
    },
    /// A busy-wait delay ran.
    Delayed {
        /// Requested delay.
        ns: u32,
    },
    /// The device was reset; carries the latched causes after the reset.
    HardwareReset(ResetCause),
}

/// What the simulated watchdog does when serviced below its lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowViolationPolicy {
    /// Request a reset, as on parts with a strict window.
    #[default]
    Reset,
    /// Ignore the service call.
    Ignore,
}

/// Result of firing one simulated tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimTick {
    /// The handler ran.
    Handled,
    /// Nothing is armed yet; time did not move.
    NotArmed,
    /// The watchdog requested a reset before the handler could run.
    WatchdogReset,
}

#[derive(Debug)]
struct SimWatchdogCore {
    window: WatchdogWindow,
    policy: WindowViolationPolicy,
    running: bool,
    count_ns: u64,
    reset_requested: bool,
    services_accepted: u32,
    window_violations: u32,
}

impl SimWatchdogCore {
    fn new(window: WatchdogWindow) -> Self {
        Self {
            window,
            policy: WindowViolationPolicy::default(),
            running: false,
            count_ns: 0,
            reset_requested: false,
            services_accepted: 0,
            window_violations: 0,
        }
    }

    fn count_ms(&self) -> u32 {
        u32::try_from(self.count_ns / NANOS_PER_MILLI).unwrap_or(u32::MAX)
    }

    fn advance(&mut self, ns: u64) {
        if !self.running || self.reset_requested {
            return;
        }
        self.count_ns = self.count_ns.saturating_add(ns);
        if self.count_ns >= u64::from(self.window.upper_ms) * NANOS_PER_MILLI {
            self.reset_requested = true;
        }
    }

    fn service(&mut self) -> bool {
        if !self.running || self.reset_requested {
            return false;
        }
        if self.count_ns < u64::from(self.window.lower_ms) * NANOS_PER_MILLI {
            self.window_violations = self.window_violations.saturating_add(1);
            if self.policy == WindowViolationPolicy::Reset {
                self.reset_requested = true;
            }
            return false;
        }
        self.count_ns = 0;
        self.services_accepted = self.services_accepted.saturating_add(1);
        true
    }

    fn power_cycle(&mut self) {
        self.running = false;
        self.count_ns = 0;
        self.reset_requested = false;
    }
}

#[derive(Debug)]
struct BoardState {
    latched_cause: ResetCause,
    watchdog: SimWatchdogCore,
    indicator_level: bool,
    indicator_toggles: u64,
    elapsed_ns: u64,
    bring_up_failure: Option<BringUpError>,
    journal: Vec<HardwareEvent>,
}

impl BoardState {
    fn advance(&mut self, ns: u64) -> bool {
        self.elapsed_ns = self.elapsed_ns.saturating_add(ns);
        self.watchdog.advance(ns);
        self.watchdog.reset_requested
    }
}

/// Handle to one simulated device.
///
/// Clones share the same device. Peripheral handles obtained from the board
/// ([`watchdog`](Self::watchdog), [`indicator`](Self::indicator), ...) also
/// share it, so a test can keep the board while the supervisor owns the
/// peripherals.
#[derive(Debug, Clone)]
pub struct SimBoard {
    inner: Arc<Mutex<BoardState>>,
}

impl SimBoard {
    /// A device fresh out of a power-on reset.
    #[must_use]
    pub fn power_on(window: WatchdogWindow) -> Self {
        Self::with_latched_cause(window, ResetCause::POWER_ON)
    }

    /// A device whose reset-status register already holds `cause`.
    #[must_use]
    pub fn with_latched_cause(window: WatchdogWindow, cause: ResetCause) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BoardState {
                latched_cause: cause,
                watchdog: SimWatchdogCore::new(window),
                indicator_level: false,
                indicator_toggles: 0,
                elapsed_ns: 0,
                bring_up_failure: None,
                journal: Vec::new(),
            })),
        }
    }

    /// Choose how a too-early service is handled.
    pub fn set_violation_policy(&self, policy: WindowViolationPolicy) {
        self.inner.lock().watchdog.policy = policy;
    }

    /// Make the next [`BoardSupport::init`] fail (or succeed again with `None`).
    pub fn set_bring_up_failure(&self, failure: Option<BringUpError>) {
        self.inner.lock().bring_up_failure = failure;
    }

    /// Handle to the reset-status register.
    #[must_use]
    pub fn reset_cause_register(&self) -> SimResetCause {
        SimResetCause {
            board: self.clone(),
        }
    }

    /// Handle to the watchdog peripheral.
    #[must_use]
    pub fn watchdog(&self) -> SimWatchdog {
        SimWatchdog {
            board: self.clone(),
        }
    }

    /// Handle to the indicator.
    #[must_use]
    pub fn indicator(&self) -> SimIndicator {
        SimIndicator {
            board: self.clone(),
        }
    }

    /// Busy-wait delay that consumes simulated time.
    #[must_use]
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            board: self.clone(),
        }
    }

    /// Periodic tick source clocked from `core_clock_hz`.
    #[must_use]
    pub fn tick_source<H: TickHandler>(&self, core_clock_hz: u32) -> SimTickSource<H> {
        SimTickSource {
            board: self.clone(),
            core_clock_hz,
            reload: None,
            handler: None,
            fired: 0,
        }
    }

    /// Let `ns` nanoseconds of simulated time pass.
    ///
    /// Returns `true` once the watchdog has requested a reset.
    pub fn advance_ns(&self, ns: u64) -> bool {
        self.inner.lock().advance(ns)
    }

    /// Let `us` microseconds of simulated time pass.
    ///
    /// Returns `true` once the watchdog has requested a reset.
    pub fn advance_us(&self, us: u64) -> bool {
        self.advance_ns(us.saturating_mul(NANOS_PER_MICRO))
    }

    /// Reset the device, latching `cause` in the reset-status register.
    ///
    /// The watchdog stops and the indicator returns low; the latch keeps any
    /// cause that was not cleared by software.
    pub fn reset(&self, cause: ResetCause) {
        let mut state = self.inner.lock();
        state.latched_cause |= cause;
        state.watchdog.power_cycle();
        state.indicator_level = false;
        let latched = state.latched_cause;
        state.journal.push(HardwareEvent::HardwareReset(latched));
    }

    /// Perform the reset the watchdog requested.
    pub fn watchdog_reset(&self) {
        self.reset(ResetCause::WATCHDOG);
    }

    /// Whether the watchdog has requested a reset that has not happened yet.
    #[must_use]
    pub fn watchdog_reset_pending(&self) -> bool {
        self.inner.lock().watchdog.reset_requested
    }

    /// Causes currently latched in the reset-status register.
    #[must_use]
    pub fn latched_cause(&self) -> ResetCause {
        self.inner.lock().latched_cause
    }

    /// Whether the watchdog is counting.
    #[must_use]
    pub fn watchdog_running(&self) -> bool {
        self.inner.lock().watchdog.running
    }

    /// Current watchdog count in milliseconds.
    #[must_use]
    pub fn watchdog_count_ms(&self) -> u32 {
        self.inner.lock().watchdog.count_ms()
    }

    /// Service calls accepted since the board was created.
    #[must_use]
    pub fn services_accepted(&self) -> u32 {
        self.inner.lock().watchdog.services_accepted
    }

    /// Service calls that landed below the lower window bound.
    #[must_use]
    pub fn window_violations(&self) -> u32 {
        self.inner.lock().watchdog.window_violations
    }

    /// Current indicator level.
    #[must_use]
    pub fn indicator_level(&self) -> bool {
        self.inner.lock().indicator_level
    }

    /// Indicator toggles since the board was created.
    #[must_use]
    pub fn indicator_toggles(&self) -> u64 {
        self.inner.lock().indicator_toggles
    }

    /// Simulated time since the board was created.
    #[must_use]
    pub fn elapsed_ns(&self) -> u64 {
        self.inner.lock().elapsed_ns
    }

    /// Copy of the hardware journal.
    #[must_use]
    pub fn journal(&self) -> Vec<HardwareEvent> {
        self.inner.lock().journal.clone()
    }

    /// Drop all recorded hardware events.
    pub fn clear_journal(&self) {
        self.inner.lock().journal.clear();
    }

    /// Number of journal entries matching `predicate`.
    pub fn count_events(&self, predicate: impl Fn(&HardwareEvent) -> bool) -> usize {
        self.inner
            .lock()
            .journal
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    fn record(&self, event: HardwareEvent) {
        self.inner.lock().journal.push(event);
    }
}

impl BoardSupport for SimBoard {
    fn init(&mut self) -> Result<(), BringUpError> {
        let mut state = self.inner.lock();
        if let Some(failure) = state.bring_up_failure {
            return Err(failure);
        }
        state.journal.push(HardwareEvent::BoardInitialised);
        Ok(())
    }
}

/// Simulated reset-status register.
#[derive(Debug, Clone)]
pub struct SimResetCause {
    board: SimBoard,
}

impl ResetCauseRegister for SimResetCause {
    fn read(&self) -> ResetCause {
        let mut state = self.board.inner.lock();
        let cause = state.latched_cause;
        state.journal.push(HardwareEvent::ResetCauseRead(cause));
        cause
    }

    fn clear(&mut self) {
        let mut state = self.board.inner.lock();
        state.latched_cause = ResetCause::empty();
        state.journal.push(HardwareEvent::ResetCauseCleared);
    }
}

/// Simulated windowed watchdog.
#[derive(Debug, Clone)]
pub struct SimWatchdog {
    board: SimBoard,
}

impl WatchdogDriver for SimWatchdog {
    fn select_clock_source(&mut self) {
        self.board.record(HardwareEvent::WatchdogClockSelected);
    }

    fn start(&mut self) {
        let mut state = self.board.inner.lock();
        state.watchdog.running = true;
        state.watchdog.count_ns = 0;
        state.journal.push(HardwareEvent::WatchdogStarted);
    }

    fn service(&mut self) {
        let mut state = self.board.inner.lock();
        let count_ms = state.watchdog.count_ms();
        let accepted = state.watchdog.service();
        state
            .journal
            .push(HardwareEvent::WatchdogServiced { count_ms, accepted });
    }

    fn window(&self) -> Option<WatchdogWindow> {
        Some(self.board.inner.lock().watchdog.window)
    }
}

/// Simulated indicator LED.
#[derive(Debug, Clone)]
pub struct SimIndicator {
    board: SimBoard,
}

impl Indicator for SimIndicator {
    fn toggle(&mut self) {
        let mut state = self.board.inner.lock();
        state.indicator_level = !state.indicator_level;
        state.indicator_toggles = state.indicator_toggles.saturating_add(1);
        let level = state.indicator_level;
        state.journal.push(HardwareEvent::IndicatorToggled { level });
    }
}

/// Busy-wait delay that advances simulated time.
#[derive(Debug, Clone)]
pub struct SimDelay {
    board: SimBoard,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut state = self.board.inner.lock();
        state.advance(u64::from(ns));
        state.journal.push(HardwareEvent::Delayed { ns });
    }
}

/// Simulated periodic tick interrupt.
///
/// [`fire`](Self::fire) plays the role of the hardware: it lets one tick
/// period elapse, then runs the installed handler to completion. Ticks are
/// therefore strictly serialized, as on the real part.
#[derive(Debug)]
pub struct SimTickSource<H> {
    board: SimBoard,
    core_clock_hz: u32,
    reload: Option<u32>,
    handler: Option<H>,
    fired: u64,
}

impl<H: TickHandler> SimTickSource<H> {
    /// Whether a handler has been installed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handler.is_some()
    }

    /// Reload value the source was armed with.
    #[must_use]
    pub fn reload(&self) -> Option<u32> {
        self.reload
    }

    /// Ticks delivered to the handler so far.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Installed handler.
    #[must_use]
    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    /// Length of one tick period.
    #[must_use]
    pub fn period_ns(&self) -> u64 {
        match self.reload {
            Some(reload) if self.core_clock_hz > 0 => {
                u64::from(reload) * NANOS_PER_SECOND / u64::from(self.core_clock_hz)
            }
            _ => 0,
        }
    }

    /// Let one tick period elapse and run the handler.
    pub fn fire(&mut self) -> SimTick {
        let period_ns = self.period_ns();
        let Some(handler) = self.handler.as_mut() else {
            return SimTick::NotArmed;
        };
        if self.board.advance_ns(period_ns) {
            return SimTick::WatchdogReset;
        }
        handler.handle_tick();
        self.fired = self.fired.saturating_add(1);
        SimTick::Handled
    }

    /// Fire up to `count` ticks, stopping early on a watchdog reset.
    ///
    /// Returns the outcome of the last tick fired ([`SimTick::Handled`] when
    /// `count` is zero and the source is armed).
    pub fn fire_n(&mut self, count: u64) -> SimTick {
        if !self.is_armed() {
            return SimTick::NotArmed;
        }
        let mut outcome = SimTick::Handled;
        for _ in 0..count {
            outcome = self.fire();
            if outcome != SimTick::Handled {
                break;
            }
        }
        outcome
    }
}

impl<H: TickHandler> TickSource<H> for SimTickSource<H> {
    fn arm(&mut self, reload: u32, handler: H) {
        self.handler = Some(handler);
        self.reload = Some(reload);
        self.board.record(HardwareEvent::TickArmed { reload });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingHandler {
        ticks: u32,
    }

    impl TickHandler for CountingHandler {
        fn handle_tick(&mut self) {
            self.ticks += 1;
        }
    }

    #[test]
    fn test_power_on_latches_power_on() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        assert_eq!(board.latched_cause(), ResetCause::POWER_ON);
        assert!(!board.watchdog_running());
    }

    #[test]
    fn test_unstarted_watchdog_never_expires() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        assert!(!board.advance_us(60_000_000));
        assert!(!board.watchdog_reset_pending());
    }

    #[test]
    fn test_service_inside_window_restarts_count() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        let mut watchdog = board.watchdog();
        watchdog.start();
        assert!(!board.advance_us(1_500_000));
        watchdog.service();
        assert_eq!(board.watchdog_count_ms(), 0);
        assert!(!board.advance_us(1_500_000));
        assert_eq!(board.services_accepted(), 1);
    }

    #[test]
    fn test_early_service_is_a_violation() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        let mut watchdog = board.watchdog();
        watchdog.start();
        board.advance_us(50_000);
        watchdog.service();
        assert_eq!(board.window_violations(), 1);
        assert!(board.watchdog_reset_pending());
    }

    #[test]
    fn test_early_service_ignored_by_policy() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        board.set_violation_policy(WindowViolationPolicy::Ignore);
        let mut watchdog = board.watchdog();
        watchdog.start();
        board.advance_us(50_000);
        watchdog.service();
        assert_eq!(board.window_violations(), 1);
        assert!(!board.watchdog_reset_pending());
        assert_eq!(board.watchdog_count_ms(), 50);
    }

    #[test]
    fn test_reset_keeps_uncleared_causes() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        board.watchdog_reset();
        assert_eq!(
            board.latched_cause(),
            ResetCause::POWER_ON | ResetCause::WATCHDOG
        );
    }

    #[test]
    fn test_tick_source_fires_after_arm() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        let mut ticks = board.tick_source::<CountingHandler>(1_000_000);
        assert_eq!(ticks.fire(), SimTick::NotArmed);

        ticks.arm(1_000, CountingHandler::default());
        assert_eq!(ticks.period_ns(), 1_000_000);
        assert_eq!(ticks.fire_n(5), SimTick::Handled);
        assert_eq!(ticks.fired(), 5);
        assert_eq!(ticks.handler().map(|h| h.ticks), Some(5));
        assert_eq!(board.elapsed_ns(), 5_000_000);
    }

    #[test]
    fn test_tick_source_stops_on_watchdog_reset() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        board.watchdog().start();
        let mut ticks = board.tick_source::<CountingHandler>(1_000_000);
        ticks.arm(1_000, CountingHandler::default());

        assert_eq!(ticks.fire_n(10_000), SimTick::WatchdogReset);
        assert_eq!(ticks.fired(), 1_999);
    }

    #[test]
    fn test_delay_consumes_time() {
        let board = SimBoard::power_on(WatchdogWindow::default());
        let mut delay = board.delay();
        delay.delay_ms(3);
        assert_eq!(board.elapsed_ns(), 3_000_000);
    }
}
