//! Reset-reason classification.
//!
//! Runs exactly once per boot, before the watchdog is started. The latched
//! reset-status register is read and then cleared unconditionally, so a
//! second classification in the same run always reports
//! [`ResetReason::Other`].

use wdt_hal::{ResetCause, ResetCauseRegister};

/// Why the previous run ended, as far as the supervisor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResetReason {
    /// The hardware watchdog expired or was serviced outside its window.
    WatchdogTimeout,
    /// Anything else, including an empty register.
    Other,
}

impl ResetReason {
    /// Get the reason as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WatchdogTimeout => "WatchdogTimeout",
            Self::Other => "Other",
        }
    }
}

impl core::fmt::Display for ResetReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result together with the raw causes it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Classified reason.
    pub reason: ResetReason,
    /// Causes latched at the time of the read.
    pub cause: ResetCause,
}

/// Read, classify and clear the reset-status register.
pub fn classify<R: ResetCauseRegister>(register: &mut R) -> ResetReason {
    classify_detailed(register).reason
}

/// Like [`classify`], also returning the raw latched causes.
pub fn classify_detailed<R: ResetCauseRegister>(register: &mut R) -> Classification {
    let cause = register.read();
    register.clear();
    let reason = if cause.is_watchdog() {
        ResetReason::WatchdogTimeout
    } else {
        ResetReason::Other
    };
    Classification { reason, cause }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Latch {
        cause: ResetCause,
        clears: u32,
    }

    impl ResetCauseRegister for Latch {
        fn read(&self) -> ResetCause {
            self.cause
        }

        fn clear(&mut self) {
            self.cause = ResetCause::empty();
            self.clears += 1;
        }
    }

    #[test]
    fn test_watchdog_bit_classifies_as_timeout() {
        let mut latch = Latch {
            cause: ResetCause::WATCHDOG | ResetCause::POWER_VALIDATION,
            clears: 0,
        };
        let detailed = classify_detailed(&mut latch);
        assert_eq!(detailed.reason, ResetReason::WatchdogTimeout);
        assert_eq!(
            detailed.cause,
            ResetCause::WATCHDOG | ResetCause::POWER_VALIDATION
        );
        assert_eq!(latch.clears, 1);
    }

    #[test]
    fn test_second_classification_sees_cleared_latch() {
        let mut latch = Latch {
            cause: ResetCause::WATCHDOG,
            clears: 0,
        };
        assert_eq!(classify(&mut latch), ResetReason::WatchdogTimeout);
        assert_eq!(classify(&mut latch), ResetReason::Other);
    }

    #[test]
    fn test_other_causes_are_cleared_too() {
        let mut latch = Latch {
            cause: ResetCause::POWER_ON,
            clears: 0,
        };
        assert_eq!(classify(&mut latch), ResetReason::Other);
        assert!(latch.cause.is_empty());
        assert_eq!(latch.clears, 1);
    }

    #[test]
    fn test_empty_register_is_other() {
        let mut latch = Latch {
            cause: ResetCause::empty(),
            clears: 0,
        };
        assert_eq!(classify(&mut latch), ResetReason::Other);
    }
}
