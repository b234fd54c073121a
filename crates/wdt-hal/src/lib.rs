//! # wdt-hal
//!
//! Hardware seams for supervising a microcontroller watchdog.
//!
//! This crate is `#![no_std]`-compatible and describes the few peripherals the
//! supervisor core touches, without modelling any of them beyond what the core
//! needs:
//!
//! - [`ResetCauseRegister`] - the latched device reset-status register
//! - [`WatchdogDriver`] - start and service a windowed hardware watchdog
//! - [`Indicator`] - a binary diagnostic output (usually an LED)
//! - [`TickSource`] / [`TickHandler`] - the single periodic tick interrupt
//! - [`slot`] - the handler slot shared with the tick interrupt, and
//!   [`SlotTickSource`] over any [`PeriodicTimer`]
//! - [`BoardSupport`] - board bring-up, fatal on failure
//! - [`CycleDelay`] - calibrated busy-wait delay implementing `DelayNs`
//!
//! With the `sim` feature (on by default) the [`sim`] module provides a
//! simulated MCU whose watchdog really expires and latches a watchdog reset
//! cause, for host tests and the `wdt-sim` binary. With the `cortex-m`
//! feature the [`cortex_m_impl`] module provides SysTick as the periodic timer.
//!
//! ## Example
//!
//! ```rust
//! use wdt_hal::prelude::*;
//! use wdt_hal::sim::SimBoard;
//!
//! let board = SimBoard::power_on(WatchdogWindow::default());
//! let mut watchdog = board.watchdog();
//! watchdog.start();
//! board.advance_us(500_000);
//! watchdog.service();
//! assert!(board.watchdog_running());
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

pub mod board;
pub mod delay;
pub mod indicator;
pub mod prelude;
pub mod reset_cause;
pub mod slot;
pub mod tick;
pub mod watchdog;

#[cfg(feature = "sim")]
#[cfg_attr(docsrs, doc(cfg(feature = "sim")))]
pub mod sim;

#[cfg(feature = "cortex-m")]
#[cfg_attr(docsrs, doc(cfg(feature = "cortex-m")))]
pub mod cortex_m_impl;

pub use board::{BoardSupport, BringUpError, NoBringUp};
pub use delay::CycleDelay;
pub use indicator::{Indicator, PinIndicator};
pub use reset_cause::{ResetCause, ResetCauseRegister};
pub use slot::{PeriodicTimer, SlotTickSource, TickSlot};
pub use tick::{MAX_TICK_RELOAD, TickHandler, TickSource, counter_reload, reload_for};
pub use watchdog::{WatchdogDriver, WatchdogWindow};
