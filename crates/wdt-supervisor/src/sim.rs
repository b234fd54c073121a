//! The supervisor wired to [`wdt_hal::sim::SimBoard`].

use wdt_hal::sim::{SimBoard, SimDelay, SimIndicator, SimResetCause, SimTickSource, SimWatchdog};

use crate::scheduler::FeedScheduler;
use crate::supervisor::{BootOutcome, NormalMode, Supervisor, SupervisorParts};

/// Feed scheduler over simulated peripherals.
pub type SimScheduler<'s> = FeedScheduler<'s, SimWatchdog, SimIndicator>;

/// Simulated tick source driving a [`SimScheduler`].
pub type SimTicks<'s> = SimTickSource<SimScheduler<'s>>;

/// Peripherals of a [`SimBoard`].
pub type SimParts<'s> = SupervisorParts<SimResetCause, SimWatchdog, SimIndicator, SimTicks<'s>, SimDelay>;

/// Supervisor over a [`SimBoard`].
pub type SimSupervisor<'s> =
    Supervisor<'s, SimResetCause, SimWatchdog, SimIndicator, SimTicks<'s>, SimDelay>;

/// Boot outcome on a [`SimBoard`].
pub type SimBootOutcome<'s> = BootOutcome<'s, SimIndicator, SimTicks<'s>, SimDelay>;

/// Normal mode on a [`SimBoard`].
pub type SimNormalMode<'s> = NormalMode<'s, SimTicks<'s>>;

/// Take every peripheral the supervisor needs from `board`.
#[must_use]
pub fn sim_parts<'s>(board: &SimBoard, core_clock_hz: u32) -> SimParts<'s> {
    SupervisorParts {
        reset_cause: board.reset_cause_register(),
        watchdog: board.watchdog(),
        indicator: board.indicator(),
        ticks: board.tick_source(core_clock_hz),
        delay: board.delay(),
    }
}
