//! Parquet fixtures written through DuckDB for unit tests.

use crate::extract::{vet, ExtractFile};
use crate::HerdDb;
use herd_core::ExtractKind;
use std::path::Path;

/// Write the result of `select` to a Parquet file at `path`.
pub(crate) fn write_parquet(db: &HerdDb, path: &Path, select: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    db.conn()
        .execute_batch(&format!(
            "COPY ({select}) TO '{}' (FORMAT PARQUET)",
            path.display()
        ))
        .unwrap();
}

/// Write a fixture and vet it against `kind`, expecting acceptance.
pub(crate) fn extract_file(
    db: &HerdDb,
    path: &Path,
    kind: ExtractKind,
    select: &str,
) -> ExtractFile {
    write_parquet(db, path, select);
    let (mut accepted, rejected) = vet(db.conn(), kind, vec![path.display().to_string()]);
    assert!(rejected.is_empty(), "fixture rejected: {rejected:?}");
    accepted.remove(0)
}

/// Jurisdiction-lineage population rows, one `VALUES` tuple per row:
/// (state, species, herd_name, post_hunt_estimate, male_female_ratio, year, gmu_list)
pub(crate) fn population_select(rows: &[&str]) -> String {
    format!(
        "SELECT * FROM (VALUES {}) t(state, species, herd_name, post_hunt_estimate, \
         male_female_ratio, year, gmu_list)",
        rows.join(", ")
    )
}

/// Harvest rows, one `VALUES` tuple per row:
/// (state, species, season, unit, year, bulls, cows, calves, total_harvest)
pub(crate) fn harvest_select(rows: &[&str]) -> String {
    format!(
        "SELECT * FROM (VALUES {}) t(state, species, season, unit, year, bulls, cows, \
         calves, total_harvest)",
        rows.join(", ")
    )
}

pub(crate) fn count(db: &HerdDb, sql: &str) -> i64 {
    db.conn()
        .query_row(sql, [], |row| row.get::<_, i64>(0))
        .unwrap()
}
