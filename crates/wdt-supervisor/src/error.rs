//! Error types for supervisor set-up and boot.
//!
//! Every variant is `Copy` and heap-free so errors can be raised before any
//! allocator exists. Nothing in interrupt context returns an error.

use thiserror::Error;
use wdt_hal::BringUpError;

/// Errors raised while configuring or booting the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SupervisorError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    /// The tick reload does not fit the tick counter.
    #[error("tick reload {reload} is outside 1..={max}")]
    ReloadOutOfRange {
        /// Computed reload value.
        reload: u64,
        /// Largest reload the counter accepts.
        max: u32,
    },
    /// The feed interval would service the watchdog outside its window.
    #[error("feed interval {interval_ms} ms is outside the watchdog window {lower_ms}..{upper_ms} ms")]
    FeedOutsideWindow {
        /// Configured feed interval.
        interval_ms: u64,
        /// Lower window bound.
        lower_ms: u32,
        /// Upper window bound.
        upper_ms: u32,
    },
    /// Board bring-up failed; fatal by policy.
    #[error("board bring-up failed: {0}")]
    BringUp(#[from] BringUpError),
}

impl SupervisorError {
    /// Whether the only sane reaction is [`halt`](crate::halt).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::BringUp(_))
    }
}

/// A specialized `Result` type for supervisor operations.
pub type SupervisorResult<T> = core::result::Result<T, SupervisorError>;

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SupervisorError::InvalidConfiguration("ticks_wait must be > 0").to_string(),
            "invalid configuration: ticks_wait must be > 0"
        );
        assert_eq!(
            SupervisorError::ReloadOutOfRange {
                reload: 0x0100_0000,
                max: 0x00FF_FFFF
            }
            .to_string(),
            "tick reload 16777216 is outside 1..=16777215"
        );
        assert_eq!(
            SupervisorError::FeedOutsideWindow {
                interval_ms: 3000,
                lower_ms: 100,
                upper_ms: 2000
            }
            .to_string(),
            "feed interval 3000 ms is outside the watchdog window 100..2000 ms"
        );
    }

    #[test]
    fn test_bring_up_conversion_is_fatal() {
        let err: SupervisorError = BringUpError::Clock.into();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "board bring-up failed: clock configuration failed");
        assert!(!SupervisorError::InvalidConfiguration("x").is_fatal());
    }
}
