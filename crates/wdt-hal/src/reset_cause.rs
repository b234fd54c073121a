//! Device reset-status register.
//!
//! The hardware latches the cause of the most recent reset into a status
//! register that survives the reset itself. It must be cleared after it has
//! been read, otherwise the next boot reports the same stale cause.

use bitflags::bitflags;

bitflags! {
    /// Latched reset causes.
    ///
    /// The bit layout follows the reset-status register of the reference
    /// part: one bit per cause, several may be set at once (a power-on reset
    /// usually also reports power validation). Unknown bits are truncated.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResetCause: u32 {
        /// Power-on reset.
        const POWER_ON = 1 << 0;
        /// Supply watchdog (brown-out) reset.
        const SUPPLY_WATCHDOG = 1 << 1;
        /// Power validation reset.
        const POWER_VALIDATION = 1 << 2;
        /// Software-requested system reset.
        const SOFTWARE = 1 << 3;
        /// CPU lockup reset.
        const LOCKUP = 1 << 4;
        /// Watchdog timeout (or window violation) reset.
        const WATCHDOG = 1 << 5;
        /// Memory parity error reset.
        const PARITY_ERROR = 1 << 7;
    }
}

impl ResetCause {
    /// Build a cause set from a raw register value, dropping reserved bits.
    #[must_use]
    pub const fn from_register(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// Whether the watchdog-timeout bit is set.
    #[must_use]
    pub const fn is_watchdog(self) -> bool {
        self.contains(Self::WATCHDOG)
    }

    /// Name of the most significant cause, for diagnostics.
    ///
    /// Faults rank above supply events, which rank above a plain power-on.
    #[must_use]
    pub fn describe(self) -> &'static str {
        if self.contains(Self::WATCHDOG) {
            "watchdog"
        } else if self.contains(Self::LOCKUP) {
            "lockup"
        } else if self.contains(Self::PARITY_ERROR) {
            "parity-error"
        } else if self.contains(Self::SOFTWARE) {
            "software"
        } else if self.contains(Self::SUPPLY_WATCHDOG) {
            "supply-watchdog"
        } else if self.contains(Self::POWER_ON) {
            "power-on"
        } else if self.contains(Self::POWER_VALIDATION) {
            "power-validation"
        } else {
            "none"
        }
    }
}

impl core::fmt::Display for ResetCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({:#04x})", self.describe(), self.bits())
    }
}

/// Access to the latched reset-status register.
///
/// Reads cannot fail. `clear` consumes every latched bit so that the next
/// reset starts from a clean slate.
pub trait ResetCauseRegister {
    /// Snapshot the latched reset causes.
    fn read(&self) -> ResetCause;

    /// Clear all latched reset causes.
    fn clear(&mut self);
}

impl<R: ResetCauseRegister + ?Sized> ResetCauseRegister for &mut R {
    fn read(&self) -> ResetCause {
        (**self).read()
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_bits_are_truncated() {
        let cause = ResetCause::from_register(0xFFFF_FF40);
        assert!(cause.is_empty());
    }

    #[test]
    fn test_watchdog_bit() {
        assert!(ResetCause::from_register(1 << 5).is_watchdog());
        assert!(!ResetCause::POWER_ON.is_watchdog());
        assert!((ResetCause::POWER_ON | ResetCause::WATCHDOG).is_watchdog());
    }

    #[test]
    fn test_describe_ranks_faults_first() {
        assert_eq!(
            (ResetCause::POWER_ON | ResetCause::WATCHDOG).describe(),
            "watchdog"
        );
        assert_eq!(
            (ResetCause::POWER_ON | ResetCause::POWER_VALIDATION).describe(),
            "power-on"
        );
        assert_eq!(ResetCause::empty().describe(), "none");
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_display() {
        use std::string::ToString;
        assert_eq!(ResetCause::WATCHDOG.to_string(), "watchdog (0x20)");
    }
}
