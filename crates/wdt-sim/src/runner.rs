//! Repeated boots of the supervisor on one simulated board.
//!
//! The board outlives every boot: its reset-status latch carries the cause of
//! each reset into the next classification, exactly as the silicon does.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info};
use wdt_hal::prelude::*;
use wdt_hal::sim::{SimBoard, SimTick};
use wdt_supervisor::prelude::*;
use wdt_supervisor::sim::{SimBootOutcome, SimNormalMode, sim_parts};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// How a boot came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndedBy {
    /// The unfed watchdog reset the board.
    WatchdogReset,
    /// The per-boot time limit elapsed first.
    TimeLimit,
}

impl EndedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WatchdogReset => "watchdog-reset",
            Self::TimeLimit => "time-limit",
        }
    }
}

/// What one boot did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootReport {
    /// 1-based boot number.
    pub boot: u32,
    /// Most significant cause latched before this boot.
    pub reset_cause: String,
    /// Mode the supervisor entered.
    pub mode: SupervisorMode,
    /// Feeds performed by the tick handler.
    pub feeds: u32,
    /// Tick interrupts handled.
    pub ticks: u64,
    /// Indicator toggles during this boot.
    pub indicator_toggles: u64,
    /// Why the boot ended.
    pub ended_by: EndedBy,
}

/// Limits for one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum number of boots.
    pub boots: u32,
    /// Simulated seconds each boot may run.
    pub seconds_per_boot: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            boots: 3,
            seconds_per_boot: 30,
        }
    }
}

/// Power on a fresh board and boot it until the options or a diagnostic
/// boot end the run.
pub fn simulate(config: SupervisorConfig, options: RunOptions) -> Result<Vec<BootReport>> {
    let mut board = SimBoard::power_on(WatchdogWindow::default());
    simulate_on(&mut board, config, options)
}

/// Boot `board` repeatedly.
///
/// A watchdog reset latches the watchdog cause for the next boot; a boot that
/// reaches its time limit is followed by a software reset. Diagnostic mode is
/// terminal, so a diagnostic boot is always the last one.
pub fn simulate_on(
    board: &mut SimBoard,
    config: SupervisorConfig,
    options: RunOptions,
) -> Result<Vec<BootReport>> {
    let mut reports = Vec::new();
    for boot in 1..=options.boots {
        let report = run_boot(board, config, boot, options.seconds_per_boot)?;
        info!(
            boot,
            mode = %report.mode,
            feeds = report.feeds,
            ended_by = report.ended_by.as_str(),
            "boot finished"
        );
        let terminal = report.mode == SupervisorMode::Diagnostic;
        let ended_by = report.ended_by;
        reports.push(report);
        if terminal {
            break;
        }
        match ended_by {
            EndedBy::WatchdogReset => board.watchdog_reset(),
            EndedBy::TimeLimit => board.reset(ResetCause::SOFTWARE),
        }
    }
    Ok(reports)
}

fn run_boot(
    board: &mut SimBoard,
    config: SupervisorConfig,
    boot: u32,
    seconds: u32,
) -> Result<BootReport> {
    let reset_cause = board.latched_cause();
    let toggles_before = board.indicator_toggles();
    debug!(boot, cause = %reset_cause, "booting");

    let state = FeedSchedulerState::new();
    let supervisor = Supervisor::new(config, &state, sim_parts(board, config.core_clock_hz))
        .context("supervisor rejected the configuration")?;
    let outcome = supervisor
        .boot(board)
        .with_context(|| format!("boot {boot} failed"))?;
    let mode = outcome.mode();

    let (ticks, ended_by) = match outcome {
        SimBootOutcome::Normal(mut normal) => {
            let limit = u64::from(seconds).saturating_mul(u64::from(config.ticks_per_second));
            let ended_by = drive_normal(&mut normal, limit)?;
            (normal.tick_source().fired(), ended_by)
        }
        SimBootOutcome::Diagnostic(mut diagnostic) => {
            let started = board.elapsed_ns();
            let limit_ns = u64::from(seconds).saturating_mul(NANOS_PER_SECOND);
            while board.elapsed_ns().saturating_sub(started) < limit_ns {
                diagnostic.blink_once();
            }
            (0, EndedBy::TimeLimit)
        }
    };

    Ok(BootReport {
        boot,
        reset_cause: reset_cause.describe().to_owned(),
        mode,
        feeds: state.feed_count(),
        ticks,
        indicator_toggles: board.indicator_toggles().saturating_sub(toggles_before),
        ended_by,
    })
}

/// Fire ticks one at a time, polling between them like the idle loop does.
fn drive_normal(normal: &mut SimNormalMode<'_>, limit: u64) -> Result<EndedBy> {
    while normal.tick_source().fired() < limit {
        match normal.tick_source_mut().fire() {
            SimTick::Handled => {
                normal.poll();
            }
            SimTick::WatchdogReset => return Ok(EndedBy::WatchdogReset),
            SimTick::NotArmed => bail!("normal mode left the tick source unarmed"),
        }
    }
    Ok(EndedBy::TimeLimit)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_default_run_resets_into_diagnostic_mode() -> TestResult {
        let reports = simulate(SupervisorConfig::default(), RunOptions::default())?;
        assert_eq!(reports.len(), 2);

        let first = reports.first().ok_or("missing first boot")?;
        assert_eq!(first.boot, 1);
        assert_eq!(first.reset_cause, "power-on");
        assert_eq!(first.mode, SupervisorMode::Normal);
        assert_eq!(first.feeds, 10);
        assert_eq!(first.ticks, 11_999);
        assert_eq!(first.indicator_toggles, 10);
        assert_eq!(first.ended_by, EndedBy::WatchdogReset);

        let second = reports.get(1).ok_or("missing second boot")?;
        assert_eq!(second.reset_cause, "watchdog");
        assert_eq!(second.mode, SupervisorMode::Diagnostic);
        assert_eq!(second.feeds, 0);
        assert_eq!(second.ticks, 0);
        assert_eq!(second.indicator_toggles, 300);
        assert_eq!(second.ended_by, EndedBy::TimeLimit);
        Ok(())
    }

    #[test]
    fn test_time_limit_is_followed_by_software_reset() -> TestResult {
        let options = RunOptions {
            boots: 2,
            seconds_per_boot: 5,
        };
        let reports = simulate(SupervisorConfig::default(), options)?;
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert_eq!(report.mode, SupervisorMode::Normal);
            assert_eq!(report.feeds, 5);
            assert_eq!(report.ticks, 5_000);
            assert_eq!(report.ended_by, EndedBy::TimeLimit);
        }
        let causes: Vec<&str> = reports.iter().map(|r| r.reset_cause.as_str()).collect();
        assert_eq!(causes, ["power-on", "software"]);
        Ok(())
    }

    #[test]
    fn test_zero_boots_produces_no_reports() -> TestResult {
        let options = RunOptions {
            boots: 0,
            seconds_per_boot: 30,
        };
        assert!(simulate(SupervisorConfig::default(), options)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_bring_up_failure_is_reported_with_boot_number() {
        let mut board = SimBoard::power_on(WatchdogWindow::default());
        board.set_bring_up_failure(Some(BringUpError::Clock));
        let result = simulate_on(&mut board, SupervisorConfig::default(), RunOptions::default());
        let message = result.map_or_else(|e| format!("{e:#}"), |_| String::new());
        assert!(message.contains("boot 1 failed"), "{message}");
    }

    #[test]
    fn test_larger_budget_outlasts_time_limit() -> TestResult {
        let config = SupervisorConfig::builder().max_num_feeds(100).build()?;
        let options = RunOptions {
            boots: 1,
            seconds_per_boot: 20,
        };
        let reports = simulate(config, options)?;
        let only = reports.first().ok_or("missing boot")?;
        assert_eq!(only.feeds, 20);
        assert_eq!(only.ended_by, EndedBy::TimeLimit);
        Ok(())
    }

    #[test]
    fn test_report_serializes_snake_case_end() -> TestResult {
        let report = BootReport {
            boot: 1,
            reset_cause: "power-on".to_owned(),
            mode: SupervisorMode::Normal,
            feeds: 10,
            ticks: 11_999,
            indicator_toggles: 10,
            ended_by: EndedBy::WatchdogReset,
        };
        let value = serde_json::to_value(&report)?;
        assert_eq!(value["ended_by"], "watchdog_reset");
        assert_eq!(value["mode"], "Normal");
        assert_eq!(value["ticks"], 11_999);
        Ok(())
    }
}
