//! Harvest merger.
//!
//! Harvest extracts are already one row per unit, so each vetted file is
//! upserted straight into `harvest` with no staging step. Rows without a unit
//! (or any other key column) are dropped by the batch loader.

use crate::batch::{drop_batch, load_batch, BATCH_TABLE};
use crate::error::{StoreError, StoreResult};
use crate::extract::ExtractFile;
use duckdb::Connection;
use herd_core::sql_utils::quote_ident;
use herd_core::ExtractKind;

/// Row counts from one harvest merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestMerge {
    pub rows_read: usize,
    /// Rows inserted or updated, counted once per key per file
    pub rows_merged: usize,
    pub malformed_rows: usize,
}

fn upsert_sql() -> String {
    let kind = ExtractKind::Harvest;
    let keys = kind.key_columns();
    let columns = kind
        .columns()
        .iter()
        .map(|c| quote_ident(c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let conflict = keys
        .iter()
        .map(|k| quote_ident(k))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = kind
        .columns()
        .iter()
        .filter(|c| !keys.contains(&c.name))
        .map(|c| format!("{0} = EXCLUDED.{0}", quote_ident(c.name)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO harvest ({columns}) SELECT {columns} FROM {BATCH_TABLE} \
         ON CONFLICT ({conflict}) DO UPDATE SET {updates}"
    )
}

/// Upsert every row of `files` into `harvest`, last write wins.
///
/// Files are applied in the order given. Call inside a transaction.
pub fn merge_harvest(conn: &Connection, files: &[ExtractFile]) -> StoreResult<HarvestMerge> {
    let sql = upsert_sql();
    let mut merge = HarvestMerge::default();

    for file in files {
        if file.columns.kind() != ExtractKind::Harvest {
            return Err(StoreError::QueryError(format!(
                "{} is a {} extract, not harvest",
                file.path,
                file.columns.kind()
            )));
        }
        let counts = load_batch(conn, file)?;
        let merged = conn.execute(&sql, []).map_err(|e| {
            StoreError::QueryError(format!("harvest upsert failed for {}: {e}", file.path))
        })?;
        log::debug!("Merged {merged} harvest row(s) from {}", file.path);

        merge.rows_read += counts.rows_read;
        merge.malformed_rows += counts.malformed;
        merge.rows_merged += merged;
    }
    drop_batch(conn)?;

    log::info!(
        "Merged {} row(s) into harvest from {} file(s) ({} skipped)",
        merge.rows_merged,
        files.len(),
        merge.malformed_rows
    );
    Ok(merge)
}

#[cfg(test)]
#[path = "harvest_test.rs"]
mod tests;
