//! Readers over the production tables.
//!
//! Returns plain Rust types so callers don't need a direct `duckdb` dependency.

use crate::error::{StoreError, StoreResult};
use crate::row_helpers::get_column_as_string;
use duckdb::Connection;
use herd_core::sql_utils::quote_qualified;
use herd_core::{HarvestRecord, PopulationLineage, PopulationRecord};

/// Tables an operator may inspect
pub const KNOWN_TABLES: &[&str] = &[
    "population",
    "herd_population",
    "harvest",
    "staging.population",
    "staging.herd_population",
    "herd_meta.merge_runs",
];

fn check_table(table: &str) -> StoreResult<()> {
    if KNOWN_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(StoreError::QueryError(format!("unknown table '{table}'")))
    }
}

/// Row count of one of the [`KNOWN_TABLES`].
pub fn table_row_count(conn: &Connection, table: &str) -> StoreResult<i64> {
    check_table(table)?;
    let count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_qualified(table)),
            [],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::QueryError(format!("count failed for {table}: {e}")))?;
    Ok(count)
}

/// Every row of a table as strings, in a total order over all columns.
///
/// Two dumps compare equal exactly when the table contents are equal.
pub fn dump_table(conn: &Connection, table: &str) -> StoreResult<Vec<Vec<String>>> {
    check_table(table)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} ORDER BY ALL",
        quote_qualified(table)
    ))?;
    let rows: Vec<Vec<String>> = stmt
        .query_map([], |row| {
            let col_count = row.as_ref().column_count();
            Ok((0..col_count)
                .map(|i| get_column_as_string(row, i))
                .collect())
        })
        .map_err(|e| StoreError::QueryError(format!("dump of {table} failed: {e}")))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Production population rows for `lineage`, ordered by key.
pub fn population_rows(
    conn: &Connection,
    lineage: PopulationLineage,
) -> StoreResult<Vec<PopulationRecord>> {
    let sql = match lineage {
        PopulationLineage::Jurisdiction => {
            "SELECT state, species, herd_name, dau, gmu, post_hunt_estimate, male_female_ratio, year
             FROM population ORDER BY state, species, year, gmu"
        }
        PopulationLineage::Herd => {
            "SELECT CAST(NULL AS VARCHAR), CAST(NULL AS VARCHAR), herd_name, dau, gmu,
                    post_hunt_estimate, bull_cow_ratio, year
             FROM herd_population ORDER BY herd_name, year, gmu"
        }
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PopulationRecord {
                state: row.get(0)?,
                species: row.get(1)?,
                herd_name: row.get(2)?,
                dau: row.get(3)?,
                gmu: row.get(4)?,
                post_hunt_estimate: row.get(5)?,
                sex_ratio: row.get(6)?,
                year: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Production harvest rows, ordered by key.
pub fn harvest_rows(conn: &Connection) -> StoreResult<Vec<HarvestRecord>> {
    let mut stmt = conn.prepare(
        "SELECT state, species, season, unit, year, adult_male, adult_female, young,
                total_harvest, total_hunters, percent_success, total_rec_days
         FROM harvest ORDER BY state, species, unit, year, season",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(HarvestRecord {
                state: row.get(0)?,
                species: row.get(1)?,
                season: row.get(2)?,
                unit: row.get(3)?,
                year: row.get(4)?,
                adult_male: row.get(5)?,
                adult_female: row.get(6)?,
                young: row.get(7)?,
                total_harvest: row.get(8)?,
                total_hunters: row.get(9)?,
                percent_success: row.get(10)?,
                total_rec_days: row.get(11)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
