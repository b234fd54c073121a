//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use wdt_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_some, must_with};

#[cfg(feature = "tracking")]
pub use crate::tracking::{AllocationGuard, track};

/// Return type for fallible tests.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;
