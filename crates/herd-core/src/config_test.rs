use super::*;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: co_elk").unwrap();
    assert_eq!(config.name, "co_elk");
    assert_eq!(config.database.path, "./data/database/herd_data.duckdb");
    assert_eq!(config.extracts.population, "**/population/*/*.parquet");
    assert_eq!(config.extracts.harvest, "**/harvest/*/*/*.parquet");
    assert!(config.extracts.legacy_population.is_none());
    assert_eq!(config.on_load_error, LoadErrorPolicy::Skip);
    assert_eq!(config.s3.url_style, "path");
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: herd_knowledge
source_root: s3://grand-lake/processed
database:
  path: ./warehouse.duckdb
extracts:
  population: "co/*/population/*/*.parquet"
  harvest: "co/*/harvest/*/*/*.parquet"
  legacy_population: "elk/population/**/*.parquet"
staging:
  population: merge
  legacy_population: full_refresh
on_load_error: abort
s3:
  region: us-west-2
  url_style: vhost
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert!(config.is_remote_source());
    assert_eq!(config.on_load_error, LoadErrorPolicy::Abort);
    assert_eq!(
        config.refresh_policy(PopulationLineage::Jurisdiction),
        RefreshPolicy::Merge
    );
    assert_eq!(
        config.refresh_policy(PopulationLineage::Herd),
        RefreshPolicy::FullRefresh
    );
    assert_eq!(config.s3.region.as_deref(), Some("us-west-2"));
}

#[test]
fn test_default_refresh_policies() {
    let config: Config = serde_yaml::from_str("name: test").unwrap();
    assert_eq!(
        config.refresh_policy(PopulationLineage::Jurisdiction),
        RefreshPolicy::FullRefresh
    );
    assert_eq!(
        config.refresh_policy(PopulationLineage::Herd),
        RefreshPolicy::Merge
    );
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: test\nmodel_paths: [x]");
    assert!(result.is_err());
}

#[test]
fn test_extract_glob_joins_root() {
    let config = Config::from_locations("t", "/data/processed/", ":memory:");
    assert_eq!(
        config.extract_glob(ExtractKind::Population).unwrap(),
        "/data/processed/**/population/*/*.parquet"
    );
    assert_eq!(
        config.extract_glob(ExtractKind::Harvest).unwrap(),
        "/data/processed/**/harvest/*/*/*.parquet"
    );
    assert!(config.extract_glob(ExtractKind::HerdPopulation).is_none());
}

#[test]
fn test_extract_glob_strips_leading_dot_slash() {
    let mut config = Config::from_locations("t", "s3://bucket/processed", ":memory:");
    config.extracts.legacy_population = Some("./elk/population/**/*.parquet".to_string());
    assert_eq!(
        config.extract_glob(ExtractKind::HerdPopulation).unwrap(),
        "s3://bucket/processed/elk/population/**/*.parquet"
    );
}

#[test]
fn test_validate_rejects_absolute_pattern() {
    let mut config = Config::from_locations("t", "/data", ":memory:");
    config.extracts.harvest = "/elsewhere/*.parquet".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("extracts.harvest"));
}

#[test]
fn test_validate_rejects_empty_name() {
    let config = Config::from_locations("", "/data", ":memory:");
    assert!(matches!(
        config.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_validate_rejects_bad_url_style() {
    let mut config = Config::from_locations("t", "/data", ":memory:");
    config.s3.url_style = "virtual".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_require_locations() {
    let config: Config = serde_yaml::from_str("name: test").unwrap();
    config.validate().unwrap();
    let err = config.require_locations().unwrap_err();
    assert!(err.to_string().contains("source_root"));

    let config = Config::from_locations("t", "/data", ":memory:");
    config.require_locations().unwrap();
    assert!(config.is_in_memory_db());
}

#[test]
fn test_is_remote_uri() {
    assert!(is_remote_uri("s3://bucket/key"));
    assert!(is_remote_uri("s3a://bucket/key"));
    assert!(!is_remote_uri("/tmp/processed"));
    assert!(!is_remote_uri("./data/processed"));
}

#[test]
fn test_load_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("herd.yml"),
        "name: from_dir\nsource_root: ./data/processed\n",
    )
    .unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_dir");
    assert_eq!(config.source_root, "./data/processed");
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("herd.yaml"), "name: alt\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "alt");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_lineage_tables() {
    assert_eq!(
        PopulationLineage::Jurisdiction.staging_table(),
        "staging.population"
    );
    assert_eq!(PopulationLineage::Jurisdiction.production_table(), "population");
    assert_eq!(
        PopulationLineage::Herd.staging_table(),
        "staging.herd_population"
    );
    assert_eq!(PopulationLineage::Herd.production_table(), "herd_population");
}
