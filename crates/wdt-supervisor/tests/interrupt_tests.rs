//! The supervisor armed on a slot-backed tick source, with the interrupt
//! vector simulated by `dispatch`.

#![cfg(test)]

use wdt_hal::prelude::*;
use wdt_hal::slot::{dispatch, empty_slot, with_handler};
use wdt_supervisor::prelude::*;
use wdt_test_helpers::prelude::*;

#[derive(Debug, Default)]
struct CountingWatchdog {
    starts: u32,
    services: u32,
}

impl WatchdogDriver for CountingWatchdog {
    fn start(&mut self) {
        self.starts += 1;
    }

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

#[derive(Debug)]
struct Latch(ResetCause);

impl ResetCauseRegister for Latch {
    fn read(&self) -> ResetCause {
        self.0
    }

    fn clear(&mut self) {
        self.0 = ResetCause::empty();
    }
}

#[derive(Debug, Default)]
struct RecordingTimer {
    reload: Option<u32>,
}

impl PeriodicTimer for RecordingTimer {
    fn start_periodic(&mut self, reload: u32) {
        self.reload = Some(reload);
    }
}

#[derive(Debug, Default)]
struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

type Handler = FeedScheduler<'static, CountingWatchdog, CountingIndicator>;

fn parts(
    cause: ResetCause,
    slot: &'static TickSlot<Handler>,
) -> SupervisorParts<
    Latch,
    CountingWatchdog,
    CountingIndicator,
    SlotTickSource<RecordingTimer, Handler>,
    NoDelay,
> {
    SupervisorParts {
        reset_cause: Latch(cause),
        watchdog: CountingWatchdog::default(),
        indicator: CountingIndicator::default(),
        ticks: SlotTickSource::new(RecordingTimer::default(), slot),
        delay: NoDelay,
    }
}

fn counters(slot: &TickSlot<Handler>) -> Option<(u32, u32, u32)> {
    with_handler(slot, |handler| {
        handler.map(|h| (h.watchdog().starts, h.watchdog().services, h.indicator().toggles))
    })
}

#[test]
fn test_dispatch_feeds_through_armed_scheduler() -> TestResult {
    static STATE: FeedSchedulerState = FeedSchedulerState::new();
    static TICK: TickSlot<Handler> = empty_slot();

    let supervisor = Supervisor::new(
        SupervisorConfig::default(),
        &STATE,
        parts(ResetCause::POWER_ON, &TICK),
    )?;
    let BootOutcome::Normal(mut normal) = supervisor.boot(&mut NoBringUp)? else {
        return Err("power-on boot must enter normal mode".into());
    };
    assert_eq!(normal.tick_source().timer().reload, Some(144_000));
    assert_eq!(counters(&TICK), Some((1, 0, 0)));

    for _ in 0..999 {
        assert!(dispatch(&TICK));
    }
    assert_eq!(normal.poll(), None);

    assert!(dispatch(&TICK));
    let snapshot = normal.poll().ok_or("feed not observed")?;
    assert_eq!(snapshot.feed_count, 1);
    assert_eq!(counters(&TICK), Some((1, 1, 1)));
    Ok(())
}

#[test]
fn test_dispatch_respects_feed_budget() -> TestResult {
    static STATE: FeedSchedulerState = FeedSchedulerState::new();
    static TICK: TickSlot<Handler> = empty_slot();

    let config = SupervisorConfig::builder()
        .ticks_wait(10)
        .max_num_feeds(3)
        .diagnostic_toggle_period_us(1_000)
        .build()?;
    let supervisor = Supervisor::new(config, &STATE, parts(ResetCause::SOFTWARE, &TICK))?;
    assert_eq!(supervisor.boot(&mut NoBringUp)?.mode(), SupervisorMode::Normal);

    for _ in 0..1_000 {
        dispatch(&TICK);
    }
    assert_eq!(STATE.feed_count(), 3);
    assert_eq!(counters(&TICK), Some((1, 3, 3)));
    Ok(())
}

#[test]
fn test_diagnostic_boot_leaves_slot_empty() -> TestResult {
    static STATE: FeedSchedulerState = FeedSchedulerState::new();
    static TICK: TickSlot<Handler> = empty_slot();

    let supervisor = Supervisor::new(
        SupervisorConfig::default(),
        &STATE,
        parts(ResetCause::WATCHDOG, &TICK),
    )?;
    let outcome = supervisor.boot(&mut NoBringUp)?;
    assert_eq!(outcome.mode(), SupervisorMode::Diagnostic);

    assert!(!dispatch(&TICK));
    assert_eq!(counters(&TICK), None);
    assert_eq!(STATE.snapshot(), FeedSnapshot::default());
    Ok(())
}
