//! Prelude for wdt-supervisor.
//!
//! ```rust
//! use wdt_supervisor::prelude::*;
//!
//! let config = SupervisorConfig::default();
//! assert_eq!(config.max_num_feeds, 10);
//! ```

pub use crate::config::{SupervisorConfig, SupervisorConfigBuilder};
pub use crate::diagnostics::Diagnostics;
pub use crate::error::{SupervisorError, SupervisorResult};
pub use crate::reset_reason::{Classification, ResetReason, classify, classify_detailed};
pub use crate::scheduler::{FeedScheduler, FeedSchedulerState, FeedSnapshot, TickOutcome};
pub use crate::supervisor::{
    BootOutcome, DiagnosticMode, NormalMode, Supervisor, SupervisorMode, SupervisorParts,
};
