//! Runs command implementation - show the merge-run ledger

use anyhow::Result;
use herd_db::ledger;

use crate::cli::{GlobalArgs, RunsArgs};
use crate::commands::common;

/// Execute the runs command
pub(crate) fn execute(args: &RunsArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let db = common::open_db(&config)?;
    let runs = ledger::recent_runs(db.conn(), args.limit)?;

    if runs.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    let headers = [
        "ID", "TARGET", "STATUS", "READ", "MERGED", "SKIPPED", "FILES", "FAILED", "STARTED",
        "ERROR",
    ];
    let rows: Vec<Vec<String>> = runs
        .iter()
        .map(|run| {
            vec![
                run.run_id.to_string(),
                run.target.clone(),
                run.status.clone(),
                run.rows_read.to_string(),
                run.rows_merged.to_string(),
                run.rows_skipped.to_string(),
                run.files_loaded.to_string(),
                run.files_failed.to_string(),
                run.started_at.clone(),
                run.error_message.clone().unwrap_or_default(),
            ]
        })
        .collect();
    common::print_table(&headers, &rows);
    Ok(())
}
