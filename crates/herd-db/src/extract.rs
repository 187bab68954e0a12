//! Extract discovery and inspection.
//!
//! Files are found with DuckDB's `glob()` table function, which serves local
//! directories and `s3://` roots alike, and each file's header is checked
//! against its lineage's column contract before anything is written.

use crate::error::{StoreError, StoreResult};
use crate::report::FileFailure;
use duckdb::Connection;
use herd_core::sql_utils::{quote_ident, string_literal};
use herd_core::{ExtractKind, ResolvedColumns};

/// An extract file whose header satisfies its contract
#[derive(Debug, Clone)]
pub struct ExtractFile {
    pub path: String,
    pub columns: ResolvedColumns,
}

/// Result of inspecting every file matching a lineage's pattern
#[derive(Debug, Clone)]
pub struct ExtractAudit {
    pub kind: ExtractKind,
    pub pattern: String,
    pub accepted: Vec<ExtractFile>,
    pub rejected: Vec<FileFailure>,
}

/// List files matching `pattern`, sorted by path.
pub fn discover(conn: &Connection, pattern: &str) -> StoreResult<Vec<String>> {
    let sql = format!("SELECT file FROM glob({}) ORDER BY file", string_literal(pattern));
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StoreError::QueryError(format!("glob failed for {pattern}: {e}")))?;
    let files = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| StoreError::QueryError(format!("glob failed for {pattern}: {e}")))?
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("{} file(s) match {pattern}", files.len());
    Ok(files)
}

/// Column names of a Parquet file, in file order.
pub fn inspect_columns(conn: &Connection, path: &str) -> StoreResult<Vec<String>> {
    let sql = format!(
        "DESCRIBE SELECT * FROM read_parquet({})",
        string_literal(path)
    );
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Split `paths` into files satisfying the `kind` contract and rejections.
///
/// Runs outside any transaction: an unreadable file fails its statement, and
/// a failed statement aborts the enclosing DuckDB transaction.
pub fn vet(
    conn: &Connection,
    kind: ExtractKind,
    paths: Vec<String>,
) -> (Vec<ExtractFile>, Vec<FileFailure>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for path in paths {
        let reason = match inspect_columns(conn, &path) {
            Ok(headers) => match ResolvedColumns::resolve(kind, &headers) {
                Ok(columns) => {
                    accepted.push(ExtractFile { path, columns });
                    continue;
                }
                Err(missing) => format!("missing required column(s): {}", missing.join(", ")),
            },
            Err(e) => format!("unreadable: {e}"),
        };
        log::warn!("Rejected {kind} extract {path}: {reason}");
        rejected.push(FileFailure { path, reason });
    }
    (accepted, rejected)
}

/// Discover and vet every file matching `pattern` without loading anything.
pub fn audit(conn: &Connection, kind: ExtractKind, pattern: &str) -> StoreResult<ExtractAudit> {
    let paths = discover(conn, pattern)?;
    if paths.is_empty() {
        log::warn!("No {kind} extract files match {pattern}");
    }
    let (accepted, rejected) = vet(conn, kind, paths);
    Ok(ExtractAudit {
        kind,
        pattern: pattern.to_string(),
        accepted,
        rejected,
    })
}

/// `SELECT` list casting a file's source headers onto the canonical columns.
///
/// Text is trimmed with empty strings read as NULL; other values that fail to
/// cast become NULL, as do negative values of a non-negative column. A column with a fallback is filled from the fallback
/// column, prefixed with its upper-cased name (`DAU_E-2`).
pub(crate) fn projection(columns: &ResolvedColumns) -> String {
    columns
        .iter()
        .map(|(spec, source)| {
            let mut expr = cast_expr(spec.sql_type, source);
            if spec.non_negative && source.is_some() {
                expr = format!("CASE WHEN {expr} >= 0 THEN {expr} END");
            }
            if let Some(fallback) = spec.fallback {
                let fallback_expr = columns
                    .iter()
                    .find(|(other, _)| other.name == fallback)
                    .map(|(other, other_source)| cast_expr(other.sql_type, other_source))
                    .unwrap_or_else(|| "NULL".to_string());
                expr = format!(
                    "COALESCE({expr}, {} || {fallback_expr})",
                    string_literal(&format!("{}_", fallback.to_uppercase()))
                );
            }
            format!("{expr} AS {}", quote_ident(spec.name))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn cast_expr(sql_type: &str, source: Option<&str>) -> String {
    match source {
        None => format!("CAST(NULL AS {sql_type})"),
        Some(header) if sql_type == "VARCHAR" => format!(
            "NULLIF(TRIM(TRY_CAST({} AS VARCHAR)), '')",
            quote_ident(header)
        ),
        Some(header) => format!("TRY_CAST({} AS {sql_type})", quote_ident(header)),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
