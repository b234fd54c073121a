//! Interrupt-driven feed scheduler.
//!
//! [`FeedSchedulerState`] is the only data shared between the tick interrupt
//! and the main context. Ownership is split by field:
//!
//! | Field        | Written by                                   | Read by        |
//! |--------------|----------------------------------------------|----------------|
//! | `tick_count` | tick interrupt                               | both           |
//! | `feed_count` | tick interrupt                               | both           |
//! | `feed_flag`  | tick interrupt (set), main context (cleared) | main context   |
//!
//! Clearing `feed_flag` is the one write from the main context. The flag is
//! advisory: losing a set/clear race only loses one diagnostic report.
//!
//! All accesses are plain atomic loads and stores, never read-modify-write,
//! so the state works on cores without compare-and-swap (`thumbv6m`).
//! The interrupt is never re-entered, which makes load-then-store updates
//! race-free with respect to each other.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};
use wdt_hal::{Indicator, TickHandler, WatchdogDriver};

/// State shared between the tick interrupt and the main context.
///
/// Lives for the whole run; a hardware reset is the only thing that zeroes
/// it again.
///
/// ```rust
/// use wdt_supervisor::FeedSchedulerState;
///
/// static STATE: FeedSchedulerState = FeedSchedulerState::new();
/// assert_eq!(STATE.feed_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct FeedSchedulerState {
    tick_count: AtomicU32,
    feed_count: AtomicU32,
    feed_flag: AtomicBool,
}

/// Point-in-time copy of [`FeedSchedulerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedSnapshot {
    /// Ticks since the last feed.
    pub tick_count: u32,
    /// Feeds performed this run.
    pub feed_count: u32,
    /// Whether a feed happened that the main context has not acknowledged.
    pub feed_flag: bool,
}

impl FeedSchedulerState {
    /// Zeroed state, usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tick_count: AtomicU32::new(0),
            feed_count: AtomicU32::new(0),
            feed_flag: AtomicBool::new(false),
        }
    }

    /// Ticks since the last feed.
    #[must_use]
    pub fn tick_count(&self) -> u32 {
        self.tick_count.load(Ordering::Relaxed)
    }

    /// Feeds performed this run.
    #[must_use]
    pub fn feed_count(&self) -> u32 {
        self.feed_count.load(Ordering::Acquire)
    }

    /// Whether an unacknowledged feed happened.
    #[must_use]
    pub fn feed_flag(&self) -> bool {
        self.feed_flag.load(Ordering::Acquire)
    }

    /// Copy all three fields.
    ///
    /// The flag is read first: if it is set, the counts that go with it are
    /// already visible.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        let feed_flag = self.feed_flag();
        FeedSnapshot {
            tick_count: self.tick_count(),
            feed_count: self.feed_count(),
            feed_flag,
        }
    }

    /// Observe and clear `feed_flag`. Main context only.
    ///
    /// Returns whether the flag was set.
    pub fn acknowledge_feed(&self) -> bool {
        if self.feed_flag.load(Ordering::Acquire) {
            self.feed_flag.store(false, Ordering::Relaxed);
            true
        } else {
            false
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still waiting for the next feed point.
    Counting,
    /// The watchdog was fed.
    Fed {
        /// Feed count after this feed.
        feed_count: u32,
    },
    /// The feed budget is spent; the watchdog is left to expire.
    BudgetExhausted,
}

/// Tick handler that feeds the watchdog every `ticks_wait` ticks, at most
/// `max_num_feeds` times.
///
/// # Real-Time Safety
///
/// [`on_tick`](Self::on_tick) is branch-light, allocation-free and never
/// logs. It is the only writer of the counters in [`FeedSchedulerState`].
#[derive(Debug)]
pub struct FeedScheduler<'s, W, I> {
    state: &'s FeedSchedulerState,
    watchdog: W,
    indicator: I,
    ticks_wait: u32,
    max_num_feeds: u32,
}

impl<'s, W, I> FeedScheduler<'s, W, I>
where
    W: WatchdogDriver,
    I: Indicator,
{
    /// Create a scheduler writing into `state`.
    pub fn new(
        state: &'s FeedSchedulerState,
        watchdog: W,
        indicator: I,
        ticks_wait: u32,
        max_num_feeds: u32,
    ) -> Self {
        Self {
            state,
            watchdog,
            indicator,
            ticks_wait,
            max_num_feeds,
        }
    }

    /// Handle one tick interrupt.
    ///
    /// Once the budget is spent, ticks keep accumulating (saturating) but
    /// neither the watchdog nor the indicator is touched again.
    pub fn on_tick(&mut self) -> TickOutcome {
        let ticks = self.state.tick_count.load(Ordering::Relaxed).saturating_add(1);
        let feeds = self.state.feed_count.load(Ordering::Relaxed);

        if feeds >= self.max_num_feeds {
            self.state.tick_count.store(ticks, Ordering::Relaxed);
            return TickOutcome::BudgetExhausted;
        }
        if ticks < self.ticks_wait {
            self.state.tick_count.store(ticks, Ordering::Relaxed);
            return TickOutcome::Counting;
        }

        self.indicator.toggle();
        self.watchdog.service();

        let feeds = feeds.saturating_add(1);
        self.state.tick_count.store(0, Ordering::Relaxed);
        self.state.feed_count.store(feeds, Ordering::Release);
        // Published last so an observer that sees the flag sees the counts.
        self.state.feed_flag.store(true, Ordering::Release);

        TickOutcome::Fed { feed_count: feeds }
    }

    /// Shared state this scheduler writes.
    #[must_use]
    pub fn state(&self) -> &'s FeedSchedulerState {
        self.state
    }

    /// Ticks between feeds.
    #[must_use]
    pub fn ticks_wait(&self) -> u32 {
        self.ticks_wait
    }

    /// Feed budget.
    #[must_use]
    pub fn max_num_feeds(&self) -> u32 {
        self.max_num_feeds
    }

    /// Watchdog driver.
    #[must_use]
    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    /// Indicator.
    #[must_use]
    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}

impl<W, I> TickHandler for FeedScheduler<'_, W, I>
where
    W: WatchdogDriver,
    I: Indicator,
{
    fn handle_tick(&mut self) {
        self.on_tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingWatchdog {
        services: u32,
    }

    impl WatchdogDriver for CountingWatchdog {
        fn start(&mut self) {}

        fn service(&mut self) {
            self.services += 1;
        }
    }

    #[derive(Debug, Default)]
    struct CountingIndicator {
        toggles: u32,
    }

    impl Indicator for CountingIndicator {
        fn toggle(&mut self) {
            self.toggles += 1;
        }
    }

    fn scheduler(
        state: &FeedSchedulerState,
    ) -> FeedScheduler<'_, CountingWatchdog, CountingIndicator> {
        FeedScheduler::new(
            state,
            CountingWatchdog::default(),
            CountingIndicator::default(),
            1000,
            10,
        )
    }

    #[test]
    fn test_new_state_is_zeroed() {
        let state = FeedSchedulerState::new();
        assert_eq!(state.snapshot(), FeedSnapshot::default());
    }

    #[test]
    fn test_feeds_on_the_thousandth_tick() {
        let state = FeedSchedulerState::new();
        let mut scheduler = scheduler(&state);

        for _ in 0..999 {
            assert_eq!(scheduler.on_tick(), TickOutcome::Counting);
        }
        assert_eq!(state.tick_count(), 999);
        assert_eq!(scheduler.on_tick(), TickOutcome::Fed { feed_count: 1 });
        assert_eq!(
            state.snapshot(),
            FeedSnapshot {
                tick_count: 0,
                feed_count: 1,
                feed_flag: true
            }
        );
        assert_eq!(scheduler.watchdog().services, 1);
        assert_eq!(scheduler.indicator().toggles, 1);
    }

    #[test]
    fn test_budget_stops_feeding() {
        let state = FeedSchedulerState::new();
        let mut scheduler = scheduler(&state);

        for _ in 0..10_000 {
            scheduler.on_tick();
        }
        assert_eq!(state.feed_count(), 10);

        for _ in 0..1000 {
            assert_eq!(scheduler.on_tick(), TickOutcome::BudgetExhausted);
        }
        assert_eq!(state.feed_count(), 10);
        assert_eq!(state.tick_count(), 1000);
        assert_eq!(scheduler.watchdog().services, 10);
        assert_eq!(scheduler.indicator().toggles, 10);
    }

    #[test]
    fn test_acknowledge_clears_flag_once() {
        let state = FeedSchedulerState::new();
        let mut scheduler = FeedScheduler::new(
            &state,
            CountingWatchdog::default(),
            CountingIndicator::default(),
            1,
            10,
        );
        assert!(!state.acknowledge_feed());
        scheduler.on_tick();
        assert!(state.acknowledge_feed());
        assert!(!state.acknowledge_feed());
        assert_eq!(state.feed_count(), 1);
    }

    #[test]
    fn test_handle_tick_delegates() {
        let state = FeedSchedulerState::new();
        let mut scheduler = FeedScheduler::new(
            &state,
            CountingWatchdog::default(),
            CountingIndicator::default(),
            2,
            1,
        );
        scheduler.handle_tick();
        scheduler.handle_tick();
        assert_eq!(state.feed_count(), 1);
        assert_eq!(scheduler.max_num_feeds(), 1);
        assert_eq!(scheduler.ticks_wait(), 2);
    }
}
