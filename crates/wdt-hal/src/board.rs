//! Board bring-up.
//!
//! Clock trees, pin muxing and the debug UART are vendor setup with no
//! algorithmic content. The supervisor only needs to know whether bring-up
//! succeeded; failure is fatal by policy because no peripheral can be
//! trusted afterwards.

use thiserror::Error;

/// Board bring-up failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BringUpError {
    /// Clock tree configuration failed.
    #[error("clock configuration failed")]
    Clock,
    /// A named peripheral failed to initialise.
    #[error("peripheral {0} failed to initialise")]
    Peripheral(&'static str),
    /// The debug UART could not be retargeted.
    #[error("debug UART initialisation failed")]
    DebugUart,
}

/// Platform bring-up performed once, before anything else.
pub trait BoardSupport {
    /// Initialise the device and board peripherals.
    ///
    /// # Errors
    ///
    /// Returns the first bring-up step that failed.
    fn init(&mut self) -> Result<(), BringUpError>;
}

impl<B: BoardSupport + ?Sized> BoardSupport for &mut B {
    fn init(&mut self) -> Result<(), BringUpError> {
        (**self).init()
    }
}

/// A board with nothing to bring up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBringUp;

impl BoardSupport for NoBringUp {
    fn init(&mut self) -> Result<(), BringUpError> {
        Ok(())
    }
}
