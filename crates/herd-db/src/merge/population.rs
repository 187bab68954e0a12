//! Population merger.

use crate::error::{StoreError, StoreResult};
use crate::report::SkipCounts;
use duckdb::{params, Connection, Statement};
use herd_core::{
    explode, PopulationKey, PopulationLineage, PopulationRecord, StagedPopulationRecord, UnitList,
    UnitListPolicy,
};
use std::collections::BTreeSet;

/// Row counts from one population merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationMerge {
    /// Rows read from staging
    pub staged_rows: usize,
    /// Upserts applied, one per exploded row
    pub upserts: usize,
    /// Distinct production keys written
    pub keys_written: usize,
    pub skipped: SkipCounts,
}

const JURISDICTION_STAGED_SQL: &str = "\
SELECT state, species, herd_name, dau, post_hunt_estimate, male_female_ratio, year, gmu_list
FROM staging.population
ORDER BY state, species, herd_name, year";

const HERD_STAGED_SQL: &str = "\
SELECT CAST(NULL AS VARCHAR), CAST(NULL AS VARCHAR), herd_name, dau,
       post_hunt_estimate, bull_cow_ratio, year, gmu_list
FROM staging.herd_population
ORDER BY herd_name, year";

const JURISDICTION_UPSERT_SQL: &str = "\
INSERT INTO population
    (state, species, herd_name, dau, gmu, post_hunt_estimate, male_female_ratio, year)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (state, species, year, gmu) DO UPDATE SET
    herd_name = EXCLUDED.herd_name,
    dau = EXCLUDED.dau,
    post_hunt_estimate = EXCLUDED.post_hunt_estimate,
    male_female_ratio = EXCLUDED.male_female_ratio";

const HERD_UPSERT_SQL: &str = "\
INSERT INTO herd_population
    (herd_name, dau, gmu, post_hunt_estimate, bull_cow_ratio, year)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT (herd_name, year, gmu) DO UPDATE SET
    dau = EXCLUDED.dau,
    post_hunt_estimate = EXCLUDED.post_hunt_estimate,
    bull_cow_ratio = EXCLUDED.bull_cow_ratio";

/// Unit-list policy per lineage. Legacy herd extracts keep their digit guard.
fn unit_list_policy(lineage: PopulationLineage) -> UnitListPolicy {
    match lineage {
        PopulationLineage::Jurisdiction => UnitListPolicy::Lenient,
        PopulationLineage::Herd => UnitListPolicy::DigitGuard,
    }
}

/// Every staged row for `lineage`, in natural-key order.
pub fn read_staged(
    conn: &Connection,
    lineage: PopulationLineage,
) -> StoreResult<Vec<StagedPopulationRecord>> {
    let sql = match lineage {
        PopulationLineage::Jurisdiction => JURISDICTION_STAGED_SQL,
        PopulationLineage::Herd => HERD_STAGED_SQL,
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StagedPopulationRecord {
                state: row.get(0)?,
                species: row.get(1)?,
                herd_name: row.get(2)?,
                dau: row.get(3)?,
                post_hunt_estimate: row.get(4)?,
                sex_ratio: row.get(5)?,
                year: row.get(6)?,
                gmu_list: row.get(7)?,
            })
        })
        .map_err(|e| StoreError::QueryError(format!("failed to read {}: {e}", lineage.staging_table())))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Explode every staged row for `lineage` and upsert the per-unit rows into
/// its production table.
///
/// Staged rows are applied in natural-key order, so when two rows explode to
/// the same production key the later one wins. Call inside a transaction.
pub fn merge_population(
    conn: &Connection,
    lineage: PopulationLineage,
) -> StoreResult<PopulationMerge> {
    let staged = read_staged(conn, lineage)?;
    let policy = unit_list_policy(lineage);
    let mut upsert = conn.prepare(match lineage {
        PopulationLineage::Jurisdiction => JURISDICTION_UPSERT_SQL,
        PopulationLineage::Herd => HERD_UPSERT_SQL,
    })?;

    let mut merge = PopulationMerge {
        staged_rows: staged.len(),
        ..PopulationMerge::default()
    };
    let mut keys: BTreeSet<PopulationKey> = BTreeSet::new();

    for record in &staged {
        if let Some(defect) = record.defect(lineage) {
            log::warn!(
                "{lineage}: {} {} skipped: {defect}",
                record.herd_name,
                record.year
            );
            merge.skipped.invalid_records += 1;
            continue;
        }

        let rows = explode(record, policy);
        match rows.unit_list() {
            UnitList::Absent => {
                log::warn!(
                    "{lineage}: {} {} has no units; skipped",
                    record.herd_name,
                    record.year
                );
                merge.skipped.no_units += 1;
                continue;
            }
            UnitList::Rejected(reason) => {
                log::warn!(
                    "{lineage}: {} {} unit list {:?} {reason}; skipped",
                    record.herd_name,
                    record.year,
                    record.gmu_list.as_deref().unwrap_or_default()
                );
                merge.skipped.rejected_unit_lists += 1;
                continue;
            }
            UnitList::Parsed { dropped, .. } if *dropped > 0 => {
                log::warn!(
                    "{lineage}: {} {} dropped {dropped} unparseable unit(s) from {:?}",
                    record.herd_name,
                    record.year,
                    record.gmu_list.as_deref().unwrap_or_default()
                );
                merge.skipped.dropped_units += *dropped;
            }
            UnitList::Parsed { .. } => {}
        }

        for row in rows {
            apply(&mut upsert, lineage, &row)?;
            merge.upserts += 1;
            keys.insert(row.key());
        }
    }
    merge.keys_written = keys.len();

    log::info!(
        "Merged {} staged row(s) into {} ({} unit row(s), {} skipped)",
        merge.staged_rows,
        lineage.production_table(),
        merge.keys_written,
        merge.skipped.total()
    );
    Ok(merge)
}

fn apply(
    upsert: &mut Statement<'_>,
    lineage: PopulationLineage,
    row: &PopulationRecord,
) -> StoreResult<()> {
    let result = match lineage {
        PopulationLineage::Jurisdiction => upsert.execute(params![
            row.state,
            row.species,
            row.herd_name,
            row.dau,
            row.gmu,
            row.post_hunt_estimate,
            row.sex_ratio,
            row.year
        ]),
        PopulationLineage::Herd => upsert.execute(params![
            row.herd_name,
            row.dau,
            row.gmu,
            row.post_hunt_estimate,
            row.sex_ratio,
            row.year
        ]),
    };
    result.map_err(|e| {
        StoreError::QueryError(format!(
            "upsert into {} failed for {} {} unit {}: {e}",
            lineage.production_table(),
            row.herd_name,
            row.year,
            row.gmu
        ))
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "population_test.rs"]
mod tests;
