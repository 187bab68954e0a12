//! Merge-run ledger in `herd_meta.merge_runs`.
//!
//! Rows are written outside the data transaction, so a run that rolls back
//! still leaves an `error` row behind.

use crate::error::{StoreError, StoreResult};
use crate::report::{MergeReport, MergeTarget, RunStatus};
use duckdb::{params, Connection};

/// One recorded run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRun {
    pub run_id: i64,
    pub target: String,
    pub status: String,
    pub rows_read: i64,
    pub rows_merged: i64,
    pub rows_skipped: i64,
    pub files_loaded: i32,
    pub files_failed: i32,
    pub error_message: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
}

/// Record the start of a run and return its id.
pub fn begin_run(conn: &Connection, target: MergeTarget) -> StoreResult<i64> {
    conn.query_row(
        "INSERT INTO herd_meta.merge_runs (target, status) VALUES (?, ?) RETURNING run_id",
        params![target.table(), RunStatus::Running.as_str()],
        |row| row.get(0),
    )
    .map_err(|e| StoreError::QueryError(format!("failed to record run start: {e}")))
}

/// Record a run that committed.
pub fn complete_run(conn: &Connection, run_id: i64, report: &MergeReport) -> StoreResult<()> {
    let written = if matches!(report.target, MergeTarget::Staging(_)) {
        report.rows_staged
    } else {
        report.rows_merged
    };
    conn.execute(
        "UPDATE herd_meta.merge_runs SET
             status = ?, rows_read = ?, rows_merged = ?, rows_skipped = ?,
             files_loaded = ?, files_failed = ?, completed_at = now()
         WHERE run_id = ?",
        params![
            report.status().as_str(),
            report.rows_read as i64,
            written as i64,
            report.skipped.total() as i64,
            report.files_loaded.len() as i32,
            report.files_failed.len() as i32,
            run_id
        ],
    )
    .map_err(|e| StoreError::QueryError(format!("failed to record run {run_id}: {e}")))?;
    Ok(())
}

/// Record a run that failed or rolled back.
pub fn fail_run(conn: &Connection, run_id: i64, message: &str) -> StoreResult<()> {
    conn.execute(
        "UPDATE herd_meta.merge_runs
         SET status = ?, error_message = ?, completed_at = now()
         WHERE run_id = ?",
        params![RunStatus::Error.as_str(), message, run_id],
    )
    .map_err(|e| StoreError::QueryError(format!("failed to record run {run_id}: {e}")))?;
    Ok(())
}

/// The most recent `limit` runs, newest first.
pub fn recent_runs(conn: &Connection, limit: usize) -> StoreResult<Vec<MergeRun>> {
    let mut stmt = conn.prepare(
        "SELECT run_id, target, status, rows_read, rows_merged, rows_skipped,
                files_loaded, files_failed, error_message,
                strftime(started_at, '%Y-%m-%d %H:%M:%S'),
                strftime(completed_at, '%Y-%m-%d %H:%M:%S')
         FROM herd_meta.merge_runs
         ORDER BY run_id DESC
         LIMIT ?",
    )?;
    let runs = stmt
        .query_map(params![limit as i64], |row| {
            Ok(MergeRun {
                run_id: row.get(0)?,
                target: row.get(1)?,
                status: row.get(2)?,
                rows_read: row.get(3)?,
                rows_merged: row.get(4)?,
                rows_skipped: row.get(5)?,
                files_loaded: row.get(6)?,
                files_failed: row.get(7)?,
                error_message: row.get(8)?,
                started_at: row.get(9)?,
                completed_at: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(runs)
}
