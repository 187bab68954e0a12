//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use herd_core::config::is_remote_uri;
use herd_core::{Config, PopulationLineage};
use herd_db::{HerdDb, MergeReport, RunStatus};
use std::fmt;
use std::path::Path;

use crate::cli::{GlobalArgs, LineageArg};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the database is closed cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit status when a run completed but some extract files were rejected.
pub(crate) const EXIT_PARTIAL: i32 = 4;

impl From<LineageArg> for PopulationLineage {
    fn from(arg: LineageArg) -> Self {
        match arg {
            LineageArg::Population => PopulationLineage::Jurisdiction,
            LineageArg::Legacy => PopulationLineage::Herd,
        }
    }
}

/// Load herd.yml and apply command-line and environment overrides.
///
/// Relative locations in the file are resolved against the file's directory;
/// overrides are taken as given.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let (mut config, base) = match &global.config {
        Some(path) => {
            let path = Path::new(path);
            let config = Config::load(path).context("Failed to load config")?;
            (config, path.parent().unwrap_or(Path::new(".")).to_path_buf())
        }
        None => {
            let dir = Path::new(&global.project_dir);
            let config = Config::load_from_dir(dir).context("Failed to load config")?;
            (config, dir.to_path_buf())
        }
    };

    config.source_root = resolve_location(&base, &config.source_root);
    if !config.is_in_memory_db() {
        config.database.path = resolve_location(&base, &config.database.path);
    }

    if let Some(root) = &global.source_root {
        config.source_root = root.clone();
    }
    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    config.require_locations()?;
    Ok(config)
}

fn resolve_location(base: &Path, location: &str) -> String {
    if location.is_empty() || is_remote_uri(location) || Path::new(location).is_absolute() {
        return location.to_string();
    }
    base.join(location.trim_start_matches("./"))
        .display()
        .to_string()
}

/// Open the configured database with migrations applied.
pub(crate) fn open_db(config: &Config) -> Result<HerdDb> {
    HerdDb::for_config(config)
        .with_context(|| format!("Failed to open database {}", config.database.path))
}

/// Print a run summary.
pub(crate) fn print_report(report: &MergeReport) {
    let mark = match report.status() {
        RunStatus::Success => "✓",
        _ => "!",
    };
    println!(
        "  {mark} {} ({} file(s), {} row(s) read, {} row(s) written)",
        report.target,
        report.files_loaded.len(),
        report.rows_read,
        report.rows_merged.max(report.rows_staged)
    );

    let skipped = &report.skipped;
    if skipped.total() > 0 || skipped.dropped_units > 0 {
        println!(
            "      skipped: {} malformed, {} invalid, {} without units, {} rejected unit lists; {} unit(s) dropped",
            skipped.malformed_rows,
            skipped.invalid_records,
            skipped.no_units,
            skipped.rejected_unit_lists,
            skipped.dropped_units
        );
    }
    for failure in &report.files_failed {
        println!("    ✗ {} - {}", failure.path, failure.reason);
    }
}

/// `Err(ExitCode(4))` when any run left files behind.
pub(crate) fn exit_status(reports: &[MergeReport]) -> Result<()> {
    if reports.iter().any(|r| r.status() == RunStatus::Partial) {
        return Err(ExitCode(EXIT_PARTIAL).into());
    }
    Ok(())
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);
    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
    println!("{}", line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        println!("{}", line(row.clone()));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
