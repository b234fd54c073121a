//! Boot orchestration and the two terminal modes.
//!
//! ```text
//!            ┌── WatchdogTimeout ──► Diagnostic (watchdog never started)
//! Boot ──────┤
//!            └── Other ────────────► Normal (watchdog fed by the tick)
//! ```
//!
//! Both modes are terminal for the run. Only a hardware reset starts a new
//! classification.

use embedded_hal::delay::DelayNs;
use wdt_hal::{BoardSupport, Indicator, ResetCauseRegister, TickSource, WatchdogDriver};

use crate::config::SupervisorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::SupervisorResult;
use crate::reset_reason::{ResetReason, classify_detailed};
use crate::scheduler::{FeedScheduler, FeedSchedulerState, FeedSnapshot};

/// Supervisor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SupervisorMode {
    /// Not booted yet.
    Boot,
    /// Previous run ended in a watchdog reset; blinking, watchdog unfed.
    Diagnostic,
    /// Watchdog started and fed from the tick interrupt.
    Normal,
}

impl SupervisorMode {
    /// Whether the mode lasts for the rest of the run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Diagnostic | Self::Normal)
    }

    /// Get the mode as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boot => "Boot",
            Self::Diagnostic => "Diagnostic",
            Self::Normal => "Normal",
        }
    }
}

impl core::fmt::Display for SupervisorMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Peripherals handed to the supervisor.
#[derive(Debug)]
pub struct SupervisorParts<R, W, I, T, D> {
    /// Reset-status register.
    pub reset_cause: R,
    /// Watchdog driver; moves into the tick handler in normal mode.
    pub watchdog: W,
    /// Indicator; moves into the tick handler or the diagnostic loop.
    pub indicator: I,
    /// Periodic tick source.
    pub ticks: T,
    /// Busy-wait delay for diagnostic blinking.
    pub delay: D,
}

/// Validated supervisor, ready to boot.
#[derive(Debug)]
pub struct Supervisor<'s, R, W, I, T, D> {
    config: SupervisorConfig,
    state: &'s FeedSchedulerState,
    parts: SupervisorParts<R, W, I, T, D>,
    diagnostics: Diagnostics,
    reload: u32,
}

impl<'s, R, W, I, T, D> Supervisor<'s, R, W, I, T, D>
where
    R: ResetCauseRegister,
    W: WatchdogDriver,
    I: Indicator,
    T: TickSource<FeedScheduler<'s, W, I>>,
    D: DelayNs,
{
    /// Validate `config` against the peripherals.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration, a tick reload that does
    /// not fit the counter, or a feed interval outside the watchdog window
    /// (when the driver reports one).
    pub fn new(
        config: SupervisorConfig,
        state: &'s FeedSchedulerState,
        parts: SupervisorParts<R, W, I, T, D>,
    ) -> SupervisorResult<Self> {
        config.validate()?;
        let reload = config.tick_reload()?;
        if let Some(window) = parts.watchdog.window() {
            config.check_window(window)?;
        }
        Ok(Self {
            config,
            state,
            parts,
            diagnostics: Diagnostics::from_config(&config),
            reload,
        })
    }

    /// Replace the diagnostics collaborator.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Validated configuration.
    #[must_use]
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Bring up the board, classify the previous reset and enter a mode.
    ///
    /// The reset-status register is cleared in both branches. In normal mode
    /// the watchdog is started before the tick is armed, so no tick can see a
    /// stopped watchdog.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::BringUp`](crate::SupervisorError::BringUp)
    /// if bring-up fails; nothing else has been touched at that point.
    pub fn boot<B: BoardSupport>(
        self,
        board: &mut B,
    ) -> SupervisorResult<BootOutcome<'s, I, T, D>> {
        let Self {
            config,
            state,
            parts:
                SupervisorParts {
                    mut reset_cause,
                    mut watchdog,
                    indicator,
                    mut ticks,
                    delay,
                },
            diagnostics,
            reload,
        } = self;

        if let Err(error) = board.init() {
            diagnostics.bring_up_failed(error);
            return Err(error.into());
        }
        diagnostics.init_complete();

        let classification = classify_detailed(&mut reset_cause);
        diagnostics.reset_classified(classification);

        match classification.reason {
            ResetReason::WatchdogTimeout => {
                diagnostics.watchdog_reset_detected();
                Ok(BootOutcome::Diagnostic(DiagnosticMode::new(
                    indicator,
                    delay,
                    config.diagnostic_toggle_period_us,
                    diagnostics,
                )))
            }
            ResetReason::Other => {
                watchdog.select_clock_source();
                watchdog.start();
                let scheduler = FeedScheduler::new(
                    state,
                    watchdog,
                    indicator,
                    config.ticks_wait,
                    config.max_num_feeds,
                );
                ticks.arm(reload, scheduler);
                diagnostics.normal_mode_armed(reload);
                Ok(BootOutcome::Normal(NormalMode::new(ticks, state, diagnostics)))
            }
        }
    }
}

/// Mode selected at boot.
#[derive(Debug)]
pub enum BootOutcome<'s, I, T, D> {
    /// Previous run ended in a watchdog reset.
    Diagnostic(DiagnosticMode<I, D>),
    /// Normal operation.
    Normal(NormalMode<'s, T>),
}

impl<I, T, D> BootOutcome<'_, I, T, D> {
    /// Mode this outcome represents.
    #[must_use]
    pub fn mode(&self) -> SupervisorMode {
        match self {
            Self::Diagnostic(_) => SupervisorMode::Diagnostic,
            Self::Normal(_) => SupervisorMode::Normal,
        }
    }
}

/// Terminal mode after a watchdog reset: blink fast, never touch the
/// watchdog.
#[derive(Debug)]
pub struct DiagnosticMode<I, D> {
    indicator: I,
    delay: D,
    toggle_period_us: u32,
    blinks: u32,
    reported: bool,
    diagnostics: Diagnostics,
}

impl<I: Indicator, D: DelayNs> DiagnosticMode<I, D> {
    fn new(indicator: I, delay: D, toggle_period_us: u32, diagnostics: Diagnostics) -> Self {
        Self {
            indicator,
            delay,
            toggle_period_us,
            blinks: 0,
            reported: false,
            diagnostics,
        }
    }

    /// Toggle the indicator, then wait one half-period.
    ///
    /// The first toggle happens on entry, so the indication is visible at
    /// once.
    pub fn blink_once(&mut self) {
        self.indicator.toggle();
        self.delay.delay_us(self.toggle_period_us);
        self.blinks = self.blinks.saturating_add(1);
        if !self.reported && self.diagnostics.should_report_blinks(self.blinks) {
            self.reported = true;
            self.diagnostics.diagnostic_blinking(self.blinks);
        }
    }

    /// Blinks so far (saturating).
    #[must_use]
    pub fn blinks(&self) -> u32 {
        self.blinks
    }

    /// Half-period of the blink.
    #[must_use]
    pub fn toggle_period_us(&self) -> u32 {
        self.toggle_period_us
    }

    /// Blink forever.
    pub fn run(mut self) -> ! {
        loop {
            self.blink_once();
        }
    }
}

/// Terminal mode with the watchdog fed from the tick interrupt.
///
/// The main context only observes `feed_flag` for the diagnostic log.
#[derive(Debug)]
pub struct NormalMode<'s, T> {
    ticks: T,
    state: &'s FeedSchedulerState,
    diagnostics: Diagnostics,
    feeds_reported: u32,
}

impl<'s, T> NormalMode<'s, T> {
    fn new(ticks: T, state: &'s FeedSchedulerState, diagnostics: Diagnostics) -> Self {
        Self {
            ticks,
            state,
            diagnostics,
            feeds_reported: 0,
        }
    }

    /// Acknowledge a pending feed, if any, and report it.
    ///
    /// Returns the state as seen right after the acknowledgement.
    pub fn poll(&mut self) -> Option<FeedSnapshot> {
        if !self.state.acknowledge_feed() {
            return None;
        }
        let snapshot = self.state.snapshot();
        if self.diagnostics.should_report_feed(self.feeds_reported == 0) {
            self.diagnostics.feed_observed(snapshot.feed_count);
        }
        self.feeds_reported = self.feeds_reported.saturating_add(1);
        Some(snapshot)
    }

    /// Current shared state.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.snapshot()
    }

    /// Feeds acknowledged by [`poll`](Self::poll).
    #[must_use]
    pub fn feeds_observed(&self) -> u32 {
        self.feeds_reported
    }

    /// The armed tick source.
    #[must_use]
    pub fn tick_source(&self) -> &T {
        &self.ticks
    }

    /// The armed tick source, mutably. Simulators drive ticks through this.
    pub fn tick_source_mut(&mut self) -> &mut T {
        &mut self.ticks
    }

    /// Idle forever, observing feeds.
    pub fn idle(mut self) -> ! {
        loop {
            self.poll();
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_terminality() {
        assert!(!SupervisorMode::Boot.is_terminal());
        assert!(SupervisorMode::Diagnostic.is_terminal());
        assert!(SupervisorMode::Normal.is_terminal());
    }

    #[test]
    fn test_mode_as_str() {
        assert_eq!(SupervisorMode::Boot.as_str(), "Boot");
        assert_eq!(SupervisorMode::Diagnostic.as_str(), "Diagnostic");
        assert_eq!(SupervisorMode::Normal.as_str(), "Normal");
    }
}
