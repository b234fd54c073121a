//! # wdt-supervisor
//!
//! Watchdog supervision core for a microcontroller with one windowed
//! hardware watchdog and one periodic tick interrupt.
//!
//! At boot the supervisor brings up the board, classifies the latched reset
//! cause and clears it, then commits to one of two terminal modes:
//!
//! - **Diagnostic**: the previous run ended in a watchdog reset. The
//!   indicator blinks fast and the watchdog is never started.
//! - **Normal**: the watchdog is started and the [`FeedScheduler`], running
//!   in the tick interrupt, feeds it once every `ticks_wait` ticks. After
//!   `max_num_feeds` feeds it stops on purpose, so the watchdog proves it
//!   can still reset the device.
//!
//! ## Real-Time Safety
//!
//! - [`FeedScheduler::on_tick`] never allocates, blocks or logs
//! - [`FeedSchedulerState`] uses plain atomic loads and stores only
//! - errors are `Copy` and exist only before the tick is armed
//!
//! ## Example
//!
//! ```rust
//! use wdt_hal::sim::SimBoard;
//! use wdt_hal::WatchdogWindow;
//! use wdt_supervisor::prelude::*;
//!
//! # fn main() -> Result<(), SupervisorError> {
//! let mut board = SimBoard::power_on(WatchdogWindow::default());
//! let state = FeedSchedulerState::new();
//! let config = SupervisorConfig::default();
//!
//! let supervisor = Supervisor::new(
//!     config,
//!     &state,
//!     SupervisorParts {
//!         reset_cause: board.reset_cause_register(),
//!         watchdog: board.watchdog(),
//!         indicator: board.indicator(),
//!         ticks: board.tick_source(config.core_clock_hz),
//!         delay: board.delay(),
//!     },
//! )?;
//!
//! match supervisor.boot(&mut board)? {
//!     BootOutcome::Normal(mut normal) => {
//!         normal.tick_source_mut().fire_n(1000);
//!         assert_eq!(normal.poll().map(|s| s.feed_count), Some(1));
//!     }
//!     BootOutcome::Diagnostic(_) => unreachable!("power-on boot"),
//! }
//! # Ok(())
//! # }
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

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod prelude;
pub mod reset_reason;
pub mod scheduler;
pub mod supervisor;

#[cfg(feature = "sim")]
#[cfg_attr(docsrs, doc(cfg(feature = "sim")))]
pub mod sim;

pub use config::{SupervisorConfig, SupervisorConfigBuilder};
pub use diagnostics::{Diagnostics, halt, report_fatal};
pub use error::{SupervisorError, SupervisorResult};
pub use reset_reason::{Classification, ResetReason, classify, classify_detailed};
pub use scheduler::{FeedScheduler, FeedSchedulerState, FeedSnapshot, TickOutcome};
pub use supervisor::{
    BootOutcome, DiagnosticMode, NormalMode, Supervisor, SupervisorMode, SupervisorParts,
};
