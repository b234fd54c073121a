//! Prelude for wdt-hal.
//!
//! ```rust
//! use wdt_hal::prelude::*;
//!
//! let window = WatchdogWindow::new(100, 2000);
//! assert!(window.is_some());
//! ```

pub use crate::board::{BoardSupport, BringUpError, NoBringUp};
pub use crate::delay::CycleDelay;
pub use crate::indicator::{Indicator, PinIndicator};
pub use crate::reset_cause::{ResetCause, ResetCauseRegister};
pub use crate::slot::{PeriodicTimer, SlotTickSource, TickSlot};
pub use crate::tick::{MAX_TICK_RELOAD, TickHandler, TickSource, reload_for};
pub use crate::watchdog::{WatchdogDriver, WatchdogWindow};
pub use embedded_hal::delay::DelayNs;
