//! WCET benchmarks for the tick interrupt path.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use wdt_hal::prelude::*;
use wdt_supervisor::prelude::*;

#[derive(Debug, Default)]
struct NullWatchdog;

impl WatchdogDriver for NullWatchdog {
    fn start(&mut self) {}

    fn service(&mut self) {}
}

#[derive(Debug, Default)]
struct NullIndicator;

impl Indicator for NullIndicator {
    fn toggle(&mut self) {}
}

fn bench_on_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_tick");

    group.bench_function("counting", |b| {
        let state = FeedSchedulerState::new();
        let mut scheduler = FeedScheduler::new(&state, NullWatchdog, NullIndicator, u32::MAX, 10);
        b.iter(|| black_box(scheduler.on_tick()));
    });

    group.bench_function("feeding", |b| {
        let state = FeedSchedulerState::new();
        let mut scheduler = FeedScheduler::new(&state, NullWatchdog, NullIndicator, 1, u32::MAX);
        b.iter(|| black_box(scheduler.on_tick()));
    });

    group.bench_function("budget_exhausted", |b| {
        let state = FeedSchedulerState::new();
        let mut scheduler = FeedScheduler::new(&state, NullWatchdog, NullIndicator, 1, 1);
        scheduler.on_tick();
        b.iter(|| black_box(scheduler.on_tick()));
    });

    group.finish();
}

fn bench_main_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("main_context");
    let state = FeedSchedulerState::new();

    group.bench_function("snapshot", |b| {
        b.iter(|| black_box(state.snapshot()));
    });

    group.bench_function("acknowledge_feed", |b| {
        b.iter(|| black_box(state.acknowledge_feed()));
    });

    group.finish();
}

criterion_group!(benches, bench_on_tick, bench_main_context);
criterion_main!(benches);
