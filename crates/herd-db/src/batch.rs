//! Per-file working set shared by the staging loader and the harvest merger.
//!
//! One extract file at a time is projected onto its canonical columns into a
//! temp table, rows missing a key column are counted and dropped, and
//! duplicate keys within the file collapse to the last row in file order.

use crate::error::{StoreError, StoreResult};
use crate::extract::{projection, ExtractFile};
use crate::row_helpers::get_count;
use duckdb::Connection;
use herd_core::sql_utils::{quote_ident, string_literal};

/// Deduplicated, fully keyed rows of the current file
pub(crate) const BATCH_TABLE: &str = "herd_batch";

const RAW_TABLE: &str = "herd_batch_raw";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BatchCounts {
    pub(crate) rows_read: usize,
    pub(crate) malformed: usize,
    pub(crate) keyed: usize,
}

/// Replace the batch tables with the contents of `file`.
pub(crate) fn load_batch(conn: &Connection, file: &ExtractFile) -> StoreResult<BatchCounts> {
    let keys = file.columns.kind().key_columns();
    let key_list = keys
        .iter()
        .map(|k| quote_ident(k))
        .collect::<Vec<_>>()
        .join(", ");
    let key_present = keys
        .iter()
        .map(|k| format!("{} IS NOT NULL", quote_ident(k)))
        .collect::<Vec<_>>()
        .join(" AND ");

    let sql = format!(
        "CREATE OR REPLACE TEMP TABLE {RAW_TABLE} AS
         SELECT {projection}, file_row_number AS _row
         FROM read_parquet({path}, file_row_number = true);
         CREATE OR REPLACE TEMP TABLE {BATCH_TABLE} AS
         SELECT * EXCLUDE (_row) FROM {RAW_TABLE}
         WHERE {key_present}
         QUALIFY row_number() OVER (PARTITION BY {key_list} ORDER BY _row DESC) = 1;",
        projection = projection(&file.columns),
        path = string_literal(&file.path),
    );
    conn.execute_batch(&sql)
        .map_err(|e| StoreError::QueryError(format!("failed to read {}: {e}", file.path)))?;

    let (rows_read, with_keys) = conn.query_row(
        &format!("SELECT count(*), count(*) FILTER (WHERE {key_present}) FROM {RAW_TABLE}"),
        [],
        |row| Ok((get_count(row, 0)?, get_count(row, 1)?)),
    )?;
    let keyed = conn.query_row(&format!("SELECT count(*) FROM {BATCH_TABLE}"), [], |row| {
        get_count(row, 0)
    })?;

    let malformed = rows_read - with_keys;
    if malformed > 0 {
        log::warn!(
            "{}: {malformed} row(s) missing a key column ({}); skipped",
            file.path,
            keys.join(", ")
        );
    }
    if with_keys > keyed {
        log::debug!(
            "{}: {} duplicate key row(s) superseded by later rows",
            file.path,
            with_keys - keyed
        );
    }

    Ok(BatchCounts {
        rows_read,
        malformed,
        keyed,
    })
}

/// Drop the batch tables.
pub(crate) fn drop_batch(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {BATCH_TABLE}; DROP TABLE IF EXISTS {RAW_TABLE};"
    ))?;
    Ok(())
}
