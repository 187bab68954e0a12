//! Staging loader.
//!
//! Copies vetted extract files into a lineage's staging table. Under
//! [`RefreshPolicy::FullRefresh`] the table is cleared first, so it ends up
//! holding exactly the latest extract set; under [`RefreshPolicy::Merge`]
//! existing rows are kept and a row sharing a natural key with an incoming
//! row is replaced by it. Files are applied in path order, so a later file
//! supersedes an earlier one for the same key.

use crate::batch::{drop_batch, load_batch, BATCH_TABLE};
use crate::error::{StoreError, StoreResult};
use crate::extract::ExtractFile;
use duckdb::Connection;
use herd_core::sql_utils::{quote_ident, quote_qualified, string_literal};
use herd_core::{PopulationLineage, RefreshPolicy};

/// Row counts from one staging load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingLoad {
    /// Rows removed by a full refresh
    pub rows_cleared: usize,
    /// Rows read from extract files
    pub rows_read: usize,
    /// Rows written to staging
    pub rows_staged: usize,
    /// Existing staging rows replaced by an incoming row with the same key
    pub rows_replaced: usize,
    /// Rows dropped for a missing key column
    pub malformed_rows: usize,
}

/// Load `files` into the staging table for `lineage`.
///
/// Call inside a transaction: a failure part-way leaves staging half loaded.
pub fn load_staging(
    conn: &Connection,
    lineage: PopulationLineage,
    policy: RefreshPolicy,
    files: &[ExtractFile],
) -> StoreResult<StagingLoad> {
    let kind = lineage.extract_kind();
    let table = quote_qualified(lineage.staging_table());
    let mut load = StagingLoad::default();

    if let Some(file) = files.iter().find(|f| f.columns.kind() != kind) {
        return Err(StoreError::QueryError(format!(
            "{} is a {} extract, not {kind}",
            file.path,
            file.columns.kind()
        )));
    }

    if policy == RefreshPolicy::FullRefresh {
        load.rows_cleared = conn.execute(&format!("DELETE FROM {table}"), [])?;
        log::debug!("Cleared {} row(s) from {table}", load.rows_cleared);
    }

    let columns = kind
        .columns()
        .iter()
        .map(|c| quote_ident(c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let key_match = kind
        .key_columns()
        .iter()
        .map(|k| format!("s.{0} = b.{0}", quote_ident(k)))
        .collect::<Vec<_>>()
        .join(" AND ");

    for file in files {
        let counts = load_batch(conn, file)?;
        load.rows_read += counts.rows_read;
        load.malformed_rows += counts.malformed;

        load.rows_replaced += conn.execute(
            &format!("DELETE FROM {table} AS s USING {BATCH_TABLE} AS b WHERE {key_match}"),
            [],
        )?;
        load.rows_staged += conn.execute(
            &format!(
                "INSERT INTO {table} ({columns}, source_file) SELECT {columns}, {} FROM {BATCH_TABLE}",
                string_literal(&file.path)
            ),
            [],
        )?;
        log::debug!("Staged {} row(s) from {}", counts.keyed, file.path);
    }
    drop_batch(conn)?;

    log::info!(
        "Staged {} row(s) into {table} ({policy}, {} file(s))",
        load.rows_staged,
        files.len()
    );
    Ok(load)
}

#[cfg(test)]
#[path = "staging_test.rs"]
mod tests;
