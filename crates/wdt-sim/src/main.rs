//! wdt-sim - watchdog supervisor simulator
//!
//! Boots the supervisor on a simulated MCU, lets the watchdog really reset
//! the board once the feed budget is spent, and reports what every boot did.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod output;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wdt_supervisor::{SupervisorConfig, SupervisorError};

use crate::runner::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "wdt-sim")]
#[command(about = "Simulate watchdog supervision across resets")]
#[command(version)]
#[command(long_about = "
wdt-sim boots the watchdog supervisor on a simulated MCU. The first boot
follows a power-on reset. In normal mode the tick interrupt feeds the
watchdog until its feed budget is spent, the watchdog resets the board and
the next boot enters diagnostic mode, which ends the run.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Supervisor configuration (JSON); unspecified fields keep their defaults
    #[arg(long, value_name = "FILE.json")]
    config: Option<PathBuf>,

    /// Maximum number of boots to simulate
    #[arg(long, default_value_t = 3)]
    boots: u32,

    /// Simulated seconds each boot may run
    #[arg(long, default_value_t = 30)]
    seconds_per_boot: u32,

    /// Output in JSON format for machine parsing
    #[arg(long)]
    json: bool,

    /// Verbose logging; also enables the supervisor's diagnostic log
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            boots: self.boots,
            seconds_per_boot: self.seconds_per_boot,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("wdt_sim={log_level},wdt_supervisor={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(&cli) {
        if cli.json {
            output::print_error_json(&e);
        } else {
            output::print_error_human(&e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    config.debug_log |= cli.verbose > 0;

    let reports = runner::simulate(config, cli.run_options())?;
    output::print_reports(&reports, cli.json);
    Ok(())
}

/// Read a configuration file, or take the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<SupervisorConfig> {
    let Some(path) = path else {
        return Ok(SupervisorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: SupervisorConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Configuration problems exit with 4, everything else with 1.
fn exit_code(error: &anyhow::Error) -> i32 {
    let is_config_error = error.chain().any(|cause| {
        cause
            .downcast_ref::<SupervisorError>()
            .is_some_and(|e| !e.is_fatal())
            || cause.is::<serde_json::Error>()
    });
    if is_config_error { 4 } else { 1 }
}
