//! Diagnostic log of supervisor lifecycle events.
//!
//! Logging is a runtime switch on an injected collaborator, not a build
//! flag: every event is a no-op when disabled and no control-flow decision
//! depends on whether it is enabled. Only the main context logs; the tick
//! interrupt never does.

use wdt_hal::BringUpError;

use crate::config::SupervisorConfig;
use crate::reset_reason::Classification;

/// Diagnostic log gate, emitting through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    enabled: bool,
    log_every_feed: bool,
    report_after_blinks: u32,
}

impl Diagnostics {
    /// Diagnostics configured from `config`.
    #[must_use]
    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self {
            enabled: config.debug_log,
            log_every_feed: config.log_every_feed,
            report_after_blinks: config.diagnostic_report_after_blinks,
        }
    }

    /// Diagnostics that never log.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            log_every_feed: false,
            report_after_blinks: 1,
        }
    }

    /// Whether events are emitted.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Board bring-up finished.
    pub fn init_complete(&self) {
        if self.enabled {
            tracing::info!("init complete");
        }
    }

    /// Board bring-up failed.
    pub fn bring_up_failed(&self, error: BringUpError) {
        if self.enabled {
            tracing::error!(%error, "board bring-up failed");
        }
    }

    /// The reset-status register was classified.
    pub fn reset_classified(&self, classification: Classification) {
        if self.enabled {
            tracing::info!(
                reason = %classification.reason,
                cause = %classification.cause,
                "reset classified"
            );
        }
    }

    /// The previous run ended in a watchdog reset.
    pub fn watchdog_reset_detected(&self) {
        if self.enabled {
            tracing::warn!("watchdog reset detected, entering diagnostic mode");
        }
    }

    /// Whether diagnostic mode should report itself after `blinks` blinks.
    #[must_use]
    pub const fn should_report_blinks(&self, blinks: u32) -> bool {
        blinks >= self.report_after_blinks
    }

    /// Diagnostic mode is blinking.
    pub fn diagnostic_blinking(&self, blinks: u32) {
        if self.enabled {
            tracing::warn!(blinks, "toggling indicator due to watchdog reset");
        }
    }

    /// The watchdog was started and the tick armed.
    pub fn normal_mode_armed(&self, reload: u32) {
        if self.enabled {
            tracing::info!(reload, "watchdog started, tick armed");
        }
    }

    /// Whether a feed observation should be reported.
    #[must_use]
    pub const fn should_report_feed(&self, first: bool) -> bool {
        first || self.log_every_feed
    }

    /// The main context observed a feed.
    pub fn feed_observed(&self, feed_count: u32) {
        if self.enabled {
            tracing::info!(feed_count, "watchdog fed");
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Log a fatal error. Always emitted, whatever the diagnostics settings.
pub fn report_fatal(error: crate::SupervisorError) {
    tracing::error!(%error, "fatal error, halting");
}

/// Stop for good after a fatal error.
///
/// Logs through [`report_fatal`], then spins. The watchdog, if it was
/// started, will eventually reset the device.
pub fn halt(error: crate::SupervisorError) -> ! {
    report_fatal(error);
    loop {
        core::hint::spin_loop();
    }
}
