//! Supervisor configuration.

use wdt_hal::{MAX_TICK_RELOAD, WatchdogWindow};

use crate::error::{SupervisorError, SupervisorResult};

/// Supervisor configuration.
///
/// # Real-Time Safety
///
/// Plain `Copy` data, validated once before boot. Nothing here is consulted
/// from interrupt context except the two counters copied into the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct SupervisorConfig {
    /// Core clock frequency.
    ///
    /// Default: 144 MHz.
    pub core_clock_hz: u32,

    /// Tick interrupt rate.
    ///
    /// Default: 1000 (one tick per millisecond).
    pub ticks_per_second: u32,

    /// Ticks between two feeds.
    ///
    /// Default: 1000, i.e. one feed per second at the default tick rate.
    pub ticks_wait: u32,

    /// Feed budget for one run. Once spent, the watchdog is left to expire.
    ///
    /// Default: 10.
    pub max_num_feeds: u32,

    /// Half-period of the diagnostic blink.
    ///
    /// Default: 100 ms. Must be shorter than the feed interval so diagnostic
    /// blinking is visibly faster than normal-mode toggling.
    pub diagnostic_toggle_period_us: u32,

    /// Enable the diagnostic log.
    pub debug_log: bool,

    /// Report every observed feed instead of only the first one.
    pub log_every_feed: bool,

    /// Blinks after which diagnostic mode reports itself once.
    ///
    /// Default: 1.
    pub diagnostic_report_after_blinks: u32,
}

impl SupervisorConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SupervisorConfigBuilder {
        SupervisorConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first rule the configuration breaks.
    pub fn validate(&self) -> SupervisorResult<()> {
        if self.core_clock_hz == 0 {
            return Err(SupervisorError::InvalidConfiguration(
                "core_clock_hz must be greater than 0",
            ));
        }
        if self.ticks_per_second == 0 {
            return Err(SupervisorError::InvalidConfiguration(
                "ticks_per_second must be greater than 0",
            ));
        }
        self.tick_reload()?;
        if self.ticks_wait == 0 {
            return Err(SupervisorError::InvalidConfiguration(
                "ticks_wait must be greater than 0",
            ));
        }
        if self.max_num_feeds == 0 {
            return Err(SupervisorError::InvalidConfiguration(
                "max_num_feeds must be at least 1",
            ));
        }
        if self.diagnostic_toggle_period_us == 0 {
            return Err(SupervisorError::InvalidConfiguration(
                "diagnostic_toggle_period_us must be greater than 0",
            ));
        }
        if u64::from(self.diagnostic_toggle_period_us) >= self.feed_interval_us() {
            return Err(SupervisorError::InvalidConfiguration(
                "diagnostic_toggle_period_us must be shorter than the feed interval",
            ));
        }
        if self.diagnostic_report_after_blinks == 0 {
            return Err(SupervisorError::InvalidConfiguration(
                "diagnostic_report_after_blinks must be at least 1",
            ));
        }
        Ok(())
    }

    /// Reload value for the tick counter: `core_clock_hz / ticks_per_second`.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::ReloadOutOfRange`] when the value does not
    /// fit a 24-bit down-counter, and
    /// [`SupervisorError::InvalidConfiguration`] for a zero tick rate.
    pub fn tick_reload(&self) -> SupervisorResult<u32> {
        let Some(reload) = self.core_clock_hz.checked_div(self.ticks_per_second) else {
            return Err(SupervisorError::InvalidConfiguration(
                "ticks_per_second must be greater than 0",
            ));
        };
        if reload == 0 || reload > MAX_TICK_RELOAD {
            return Err(SupervisorError::ReloadOutOfRange {
                reload: u64::from(reload),
                max: MAX_TICK_RELOAD,
            });
        }
        Ok(reload)
    }

    /// Time between two feeds.
    #[must_use]
    pub fn feed_interval_us(&self) -> u64 {
        (u64::from(self.ticks_wait) * 1_000_000)
            .checked_div(u64::from(self.ticks_per_second))
            .unwrap_or(u64::MAX)
    }

    /// Check that one feed interval lands inside `window`.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::FeedOutsideWindow`] when a feed would come
    /// too early or too late.
    pub fn check_window(&self, window: WatchdogWindow) -> SupervisorResult<()> {
        let interval_us = self.feed_interval_us();
        if interval_us < window.lower_us() || interval_us >= window.upper_us() {
            return Err(SupervisorError::FeedOutsideWindow {
                interval_ms: interval_us / 1000,
                lower_ms: window.lower_ms,
                upper_ms: window.upper_ms,
            });
        }
        Ok(())
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            core_clock_hz: 144_000_000,
            ticks_per_second: 1000,
            ticks_wait: 1000,
            max_num_feeds: 10,
            diagnostic_toggle_period_us: 100_000,
            debug_log: false,
            log_every_feed: false,
            diagnostic_report_after_blinks: 1,
        }
    }
}

/// Builder for [`SupervisorConfig`].
#[derive(Debug, Default)]
pub struct SupervisorConfigBuilder {
    config: SupervisorConfig,
}

impl SupervisorConfigBuilder {
    /// Set the core clock frequency.
    #[must_use]
    pub fn core_clock_hz(mut self, hz: u32) -> Self {
        self.config.core_clock_hz = hz;
        self
    }

    /// Set the tick rate.
    #[must_use]
    pub fn ticks_per_second(mut self, rate: u32) -> Self {
        self.config.ticks_per_second = rate;
        self
    }

    /// Set the number of ticks between feeds.
    #[must_use]
    pub fn ticks_wait(mut self, ticks: u32) -> Self {
        self.config.ticks_wait = ticks;
        self
    }

    /// Set the feed budget.
    #[must_use]
    pub fn max_num_feeds(mut self, feeds: u32) -> Self {
        self.config.max_num_feeds = feeds;
        self
    }

    /// Set the diagnostic blink half-period.
    #[must_use]
    pub fn diagnostic_toggle_period_us(mut self, us: u32) -> Self {
        self.config.diagnostic_toggle_period_us = us;
        self
    }

    /// Enable or disable the diagnostic log.
    #[must_use]
    pub fn debug_log(mut self, enabled: bool) -> Self {
        self.config.debug_log = enabled;
        self
    }

    /// Report every feed, not only the first.
    #[must_use]
    pub fn log_every_feed(mut self, enabled: bool) -> Self {
        self.config.log_every_feed = enabled;
        self
    }

    /// Set after how many blinks diagnostic mode reports itself.
    #[must_use]
    pub fn diagnostic_report_after_blinks(mut self, blinks: u32) -> Self {
        self.config.diagnostic_report_after_blinks = blinks;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> SupervisorResult<SupervisorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
