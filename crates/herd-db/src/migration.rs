//! Schema migration runner.
//!
//! Tracks applied migration versions in `herd_meta.schema_version` and runs
//! any unapplied migrations on each open.

use crate::ddl::MIGRATIONS;
use crate::error::{StoreError, StoreResult};
use duckdb::Connection;

/// Ensure the `herd_meta` schema and `schema_version` table exist.
fn ensure_version_table(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE SCHEMA IF NOT EXISTS herd_meta;
         CREATE TABLE IF NOT EXISTS herd_meta.schema_version (
             version    INTEGER NOT NULL,
             applied_at TIMESTAMP NOT NULL DEFAULT now()
         );",
    )
    .map_err(|e| {
        StoreError::MigrationError(format!("failed to create schema_version table: {e}"))
    })?;
    Ok(())
}

/// Return the highest applied migration version, or 0 if none.
pub fn current_version(conn: &Connection) -> StoreResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM herd_meta.schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::MigrationError(format!("failed to read schema version: {e}")))?;
    Ok(version)
}

/// Run all unapplied migrations against `conn`.
///
/// Returns the number of migrations applied. Tables are created with
/// `IF NOT EXISTS`, so an interrupted migration can be re-run.
pub fn run_migrations(conn: &Connection) -> StoreResult<usize> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;

    let mut applied = 0;
    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        log::debug!("Applying migration v{:03}", migration.version);

        conn.execute_batch(migration.sql).map_err(|e| {
            StoreError::MigrationError(format!("migration v{:03} failed: {e}", migration.version))
        })?;

        conn.execute(
            "INSERT INTO herd_meta.schema_version (version) VALUES (?)",
            duckdb::params![migration.version],
        )
        .map_err(|e| {
            StoreError::MigrationError(format!(
                "failed to record migration v{:03}: {e}",
                migration.version
            ))
        })?;
        applied += 1;
    }
    Ok(applied)
}
