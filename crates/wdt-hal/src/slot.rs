//! Tick handler shared between thread mode and the tick interrupt.
//!
//! Thread mode installs the handler into a `static` [`TickSlot`] and then
//! starts the timer; the interrupt vector calls [`dispatch`]. Access goes
//! through `critical_section`, so the same code runs on a single-core MCU and
//! on a host with the `std` implementation.
//!
//! ```rust
//! use wdt_hal::slot::{TickSlot, dispatch, empty_slot, install};
//! use wdt_hal::TickHandler;
//!
//! struct Count(u32);
//!
//! impl TickHandler for Count {
//!     fn handle_tick(&mut self) {
//!         self.0 += 1;
//!     }
//! }
//!
//! static SLOT: TickSlot<Count> = empty_slot();
//!
//! install(&SLOT, Count(0));
//! assert!(dispatch(&SLOT));
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::tick::{TickHandler, TickSource};

/// Storage for the installed tick handler.
pub type TickSlot<H> = Mutex<RefCell<Option<H>>>;

/// A slot with no handler, for `static` initialisers.
#[must_use]
pub const fn empty_slot<H>() -> TickSlot<H> {
    Mutex::new(RefCell::new(None))
}

/// Install `handler`, returning the one it replaces.
pub fn install<H>(slot: &TickSlot<H>, handler: H) -> Option<H> {
    critical_section::with(|cs| slot.borrow_ref_mut(cs).replace(handler))
}

/// Run the installed handler once. Call from the tick interrupt.
///
/// Returns `false` when nothing is installed yet.
pub fn dispatch<H: TickHandler>(slot: &TickSlot<H>) -> bool {
    critical_section::with(|cs| match slot.borrow_ref_mut(cs).as_mut() {
        Some(handler) => {
            handler.handle_tick();
            true
        }
        None => false,
    })
}

/// Run `f` on the installed handler, if any, inside a critical section.
pub fn with_handler<H, R>(slot: &TickSlot<H>, f: impl FnOnce(Option<&mut H>) -> R) -> R {
    critical_section::with(|cs| f(slot.borrow_ref_mut(cs).as_mut()))
}

/// A hardware timer that raises the tick interrupt periodically.
pub trait PeriodicTimer {
    /// Fire every `reload` cycles of the timer clock, from now on.
    fn start_periodic(&mut self, reload: u32);
}

impl<T: PeriodicTimer + ?Sized> PeriodicTimer for &mut T {
    fn start_periodic(&mut self, reload: u32) {
        (**self).start_periodic(reload);
    }
}

/// [`TickSource`] over a [`PeriodicTimer`] whose interrupt calls
/// [`dispatch`] on `slot`.
pub struct SlotTickSource<T, H: 'static> {
    timer: T,
    slot: &'static TickSlot<H>,
}

impl<T: core::fmt::Debug, H: 'static> core::fmt::Debug for SlotTickSource<T, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotTickSource")
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl<T, H: 'static> SlotTickSource<T, H> {
    /// Drive the handler stored in `slot` from `timer`.
    pub const fn new(timer: T, slot: &'static TickSlot<H>) -> Self {
        Self { timer, slot }
    }

    /// The underlying timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The slot the interrupt dispatches from.
    pub fn slot(&self) -> &'static TickSlot<H> {
        self.slot
    }

    /// Give the timer back.
    pub fn free(self) -> T {
        self.timer
    }
}

impl<T, H> TickSource<H> for SlotTickSource<T, H>
where
    T: PeriodicTimer,
    H: TickHandler + Send + 'static,
{
    fn arm(&mut self, reload: u32, handler: H) {
        install(self.slot, handler);
        self.timer.start_periodic(reload);
    }
}
