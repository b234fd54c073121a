//! Output formatting for simulation reports

use anyhow::Error;
use colored::Colorize;
use serde_json::json;
use wdt_supervisor::SupervisorMode;

use crate::runner::{BootReport, EndedBy};

const HEADER: [&str; 7] = ["BOOT", "CAUSE", "MODE", "FEEDS", "TICKS", "TOGGLES", "ENDED BY"];

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": format!("{error:#}"),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// Print boot reports in the requested format
pub fn print_reports(reports: &[BootReport], json: bool) {
    if json {
        let output = json!({
            "success": true,
            "boots": reports,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format boot reports as JSON: {e}"),
        }
        return;
    }

    if reports.is_empty() {
        println!("{}", "No boots simulated".yellow());
        return;
    }

    println!("{}", format_row(&HEADER.map(str::to_owned)).as_str().bold());
    for report in reports {
        let row = format_row(&row_cells(report));
        let line = row.as_str();
        let line = match (report.mode, report.ended_by) {
            (SupervisorMode::Diagnostic, _) => line.yellow(),
            (_, EndedBy::WatchdogReset) => line.red(),
            _ => line.green(),
        };
        println!("{line}");
    }
}

/// Table cells for one report, in header order.
pub fn row_cells(report: &BootReport) -> [String; 7] {
    [
        report.boot.to_string(),
        report.reset_cause.clone(),
        report.mode.to_string(),
        report.feeds.to_string(),
        report.ticks.to_string(),
        report.indicator_toggles.to_string(),
        report.ended_by.as_str().to_owned(),
    ]
}

/// Left-align cells into fixed-width columns.
pub fn format_row(cells: &[String; 7]) -> String {
    let [boot, cause, mode, feeds, ticks, toggles, ended_by] = cells;
    format!("{boot:<5} {cause:<17} {mode:<11} {feeds:>5} {ticks:>8} {toggles:>8}  {ended_by}")
}
