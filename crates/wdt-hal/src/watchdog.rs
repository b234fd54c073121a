//! Windowed hardware watchdog driver.
//!
//! Window bounds, clock source and the reset action are hardware-resident
//! configuration. The supervisor only ever starts and services the watchdog;
//! this trait is the whole of its view of the peripheral.

/// Lower/upper service bounds of a windowed watchdog, in milliseconds.
///
/// A service call is accepted only while the watchdog count lies in
/// `lower_ms..upper_ms`. Servicing too early is a window violation; letting
/// the count reach `upper_ms` is a timeout. Both end in a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchdogWindow {
    /// Earliest accepted service point.
    pub lower_ms: u32,
    /// Count at which the watchdog expires.
    pub upper_ms: u32,
}

impl WatchdogWindow {
    /// Create a window, or `None` when `lower_ms >= upper_ms`.
    #[must_use]
    pub const fn new(lower_ms: u32, upper_ms: u32) -> Option<Self> {
        if lower_ms < upper_ms {
            Some(Self { lower_ms, upper_ms })
        } else {
            None
        }
    }

    /// Whether a service at `count_ms` would be accepted.
    #[must_use]
    pub const fn accepts(&self, count_ms: u32) -> bool {
        count_ms >= self.lower_ms && count_ms < self.upper_ms
    }

    /// Upper bound in microseconds.
    #[must_use]
    pub fn upper_us(&self) -> u64 {
        u64::from(self.upper_ms) * 1000
    }

    /// Lower bound in microseconds.
    #[must_use]
    pub fn lower_us(&self) -> u64 {
        u64::from(self.lower_ms) * 1000
    }
}

impl Default for WatchdogWindow {
    /// 100 ms lower bound, 2 s upper bound: accepts a once-per-second feed.
    fn default() -> Self {
        Self {
            lower_ms: 100,
            upper_ms: 2000,
        }
    }
}

/// Hardware watchdog driver.
///
/// # Real-Time Safety
///
/// `service()` is called from the periodic tick interrupt and must not
/// allocate or block. None of the operations can fail observably: the
/// service call is fire-and-forget against hardware.
pub trait WatchdogDriver {
    /// Select the watchdog clock source.
    ///
    /// Only some parts need this (e.g. routing the standby clock to the
    /// watchdog). Called once, before [`start`](Self::start).
    fn select_clock_source(&mut self) {}

    /// Start the watchdog with its preconfigured window bounds.
    fn start(&mut self);

    /// Service (feed) the watchdog.
    ///
    /// Hardware accepts the service only inside the configured window.
    fn service(&mut self);

    /// The configured window, when the driver knows it.
    fn window(&self) -> Option<WatchdogWindow> {
        None
    }
}

impl<W: WatchdogDriver + ?Sized> WatchdogDriver for &mut W {
    fn select_clock_source(&mut self) {
        (**self).select_clock_source();
    }

    fn start(&mut self) {
        (**self).start();
    }

    fn service(&mut self) {
        (**self).service();
    }

    fn window(&self) -> Option<WatchdogWindow> {
        (**self).window()
    }
}
