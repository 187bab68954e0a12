use super::*;
use crate::extract::vet;
use crate::test_fixtures::{count, extract_file, population_select, write_parquet};
use crate::HerdDb;
use herd_core::ExtractKind;
use std::path::Path;

fn population_file(db: &HerdDb, path: &Path, rows: &[&str]) -> ExtractFile {
    extract_file(db, path, ExtractKind::Population, &population_select(rows))
}

fn staged_estimates(db: &HerdDb) -> Vec<(String, i32, Option<i64>)> {
    let mut stmt = db
        .conn()
        .prepare(
            "SELECT herd_name, year, post_hunt_estimate FROM staging.population \
             ORDER BY herd_name, year",
        )
        .unwrap();
    stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_full_refresh_replaces_previous_contents() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let first = population_file(
        &db,
        &dir.path().join("a.parquet"),
        &["('co', 'elk', 'Flat Tops', 4200, 18.5, 2024, '22,23')"],
    );
    let second = population_file(
        &db,
        &dir.path().join("b.parquet"),
        &["('co', 'elk', 'White River', 9000, 21.0, 2024, '11,12')"],
    );

    load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::FullRefresh,
        &[first],
    )
    .unwrap();
    let load = load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::FullRefresh,
        &[second],
    )
    .unwrap();

    assert_eq!(load.rows_cleared, 1);
    assert_eq!(load.rows_staged, 1);
    assert_eq!(
        staged_estimates(&db),
        vec![("White River".to_string(), 2024, Some(9000))]
    );
}

#[test]
fn test_merge_policy_keeps_rows_and_replaces_same_key() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let first = population_file(
        &db,
        &dir.path().join("a.parquet"),
        &[
            "('co', 'elk', 'Flat Tops', 500, 18.5, 2024, '12')",
            "('co', 'elk', 'White River', 9000, 21.0, 2024, '11')",
        ],
    );
    let second = population_file(
        &db,
        &dir.path().join("b.parquet"),
        &["('co', 'elk', 'Flat Tops', 550, 19.0, 2024, '12')"],
    );

    load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::Merge,
        &[first],
    )
    .unwrap();
    let load = load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::Merge,
        &[second],
    )
    .unwrap();

    assert_eq!(load.rows_cleared, 0);
    assert_eq!(load.rows_replaced, 1);
    assert_eq!(
        staged_estimates(&db),
        vec![
            ("Flat Tops".to_string(), 2024, Some(550)),
            ("White River".to_string(), 2024, Some(9000)),
        ]
    );
}

#[test]
fn test_later_file_supersedes_earlier_in_one_load() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        population_file(
            &db,
            &dir.path().join("a.parquet"),
            &["('co', 'elk', 'Flat Tops', 500, 18.5, 2024, '12')"],
        ),
        population_file(
            &db,
            &dir.path().join("b.parquet"),
            &["('co', 'elk', 'Flat Tops', 550, 18.5, 2024, '12')"],
        ),
    ];
    let load = load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::FullRefresh,
        &files,
    )
    .unwrap();
    assert_eq!(load.rows_read, 2);
    assert_eq!(
        staged_estimates(&db),
        vec![("Flat Tops".to_string(), 2024, Some(550))]
    );
}

#[test]
fn test_duplicate_key_within_file_keeps_last_row() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = population_file(
        &db,
        &dir.path().join("a.parquet"),
        &[
            "('co', 'elk', 'Flat Tops', 500, 18.5, 2024, '12')",
            "('co', 'elk', 'Flat Tops', 550, 18.5, 2024, '12')",
        ],
    );
    let load = load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::FullRefresh,
        &[file],
    )
    .unwrap();
    assert_eq!(load.rows_read, 2);
    assert_eq!(load.rows_staged, 1);
    assert_eq!(
        staged_estimates(&db),
        vec![("Flat Tops".to_string(), 2024, Some(550))]
    );
}

#[test]
fn test_rows_missing_key_columns_are_malformed() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = population_file(
        &db,
        &dir.path().join("a.parquet"),
        &[
            "('co', 'elk', 'Flat Tops', 4200, 18.5, 2024, '22')",
            "('co', '  ', 'Bear''s Ears', 1000, 20.0, 2024, '2')",
            "('co', 'elk', 'White River', 9000, 21.0, NULL, '11')",
        ],
    );
    let load = load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::FullRefresh,
        &[file],
    )
    .unwrap();
    assert_eq!(load.rows_read, 3);
    assert_eq!(load.malformed_rows, 2);
    assert_eq!(load.rows_staged, 1);
}

#[test]
fn test_legacy_rows_fall_back_to_dau_herd_name() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = extract_file(
        &db,
        &dir.path().join("legacy.parquet"),
        ExtractKind::HerdPopulation,
        "SELECT * FROM (VALUES \
             ('E-2', NULL::VARCHAR, '22,23', 4200, 18.5, 2024), \
             ('E-6', 'White River', '11', 9000, 21.0, 2024), \
             (NULL::VARCHAR, NULL::VARCHAR, '5', 100, 10.0, 2024)) \
         t(\"dau*\", herd_name, gmu_list, post_hunt_estimate, \"bull_cow_ratio_(per_100)\", year)",
    );
    let load = load_staging(
        db.conn(),
        PopulationLineage::Herd,
        RefreshPolicy::Merge,
        &[file],
    )
    .unwrap();
    assert_eq!(load.malformed_rows, 1);

    let mut stmt = db
        .conn()
        .prepare("SELECT herd_name, dau, bull_cow_ratio FROM staging.herd_population ORDER BY herd_name")
        .unwrap();
    let rows: Vec<(String, Option<String>, Option<f64>)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("DAU_E-2".to_string(), Some("E-2".to_string()), Some(18.5)),
            ("White River".to_string(), Some("E-6".to_string()), Some(21.0)),
        ]
    );
}

#[test]
fn test_list_typed_unit_column_is_stringified() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = extract_file(
        &db,
        &dir.path().join("a.parquet"),
        ExtractKind::Population,
        "SELECT 'co' AS state, 'elk' AS species, 'Flat Tops' AS herd_name, \
         4200 AS post_hunt_estimate, 18.5 AS male_female_ratio, 2024 AS year, \
         [22, 23, 24] AS game_management_units_involved_in_2024",
    );
    load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::FullRefresh,
        &[file],
    )
    .unwrap();
    let gmu_list: String = db
        .conn()
        .query_row("SELECT gmu_list FROM staging.population", [], |r| r.get(0))
        .unwrap();
    assert_eq!(gmu_list, "[22, 23, 24]");
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM staging.population WHERE source_file IS NOT NULL"),
        1
    );
}

#[test]
fn test_wrong_lineage_file_is_refused() {
    let db = HerdDb::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harvest.parquet");
    write_parquet(
        &db,
        &path,
        "SELECT 'co' AS state, 'elk' AS species, 'rifle' AS season, 12 AS unit, 2024 AS year",
    );
    let (files, _) = vet(db.conn(), ExtractKind::Harvest, vec![path.display().to_string()]);
    let result = load_staging(
        db.conn(),
        PopulationLineage::Jurisdiction,
        RefreshPolicy::FullRefresh,
        &files,
    );
    assert!(result.is_err());
}
