use super::*;
use clap::Parser;
use std::path::PathBuf;

fn write_config(dir: &Path, body: &str) {
    std::fs::write(dir.join("herd.yml"), body).unwrap();
}

fn global(args: &[&str]) -> GlobalArgs {
    let mut argv = vec!["herd"];
    argv.extend_from_slice(args);
    argv.push("runs");
    let mut global = crate::cli::Cli::try_parse_from(argv).unwrap().global;
    global.source_root = None;
    global.database = None;
    global
}

#[test]
fn test_relative_locations_resolve_against_project_dir() {
    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        "name: elk\nsource_root: ./data/processed\ndatabase:\n  path: data/herd.duckdb\n",
    );
    let config = load_config(&global(&["-p", &dir.path().display().to_string()])).unwrap();
    assert_eq!(
        PathBuf::from(&config.source_root),
        dir.path().join("data/processed")
    );
    assert_eq!(
        PathBuf::from(&config.database.path),
        dir.path().join("data/herd.duckdb")
    );
}

#[test]
fn test_empty_source_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "name: elk\n");
    let err = load_config(&global(&["-p", &dir.path().display().to_string()])).unwrap_err();
    assert!(format!("{err:#}").contains("source_root must be set"));
}

#[test]
fn test_overrides_replace_file_locations() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "name: elk\nsource_root: ./data/processed\n");
    let mut args = global(&["-p", &dir.path().display().to_string()]);
    args.source_root = Some("s3://wildlife/processed".to_string());
    args.database = Some(":memory:".to_string());

    let config = load_config(&args).unwrap();
    assert_eq!(config.source_root, "s3://wildlife/processed");
    assert!(config.is_in_memory_db());
}

#[test]
fn test_remote_and_absolute_locations_are_untouched() {
    let base = Path::new("/projects/elk");
    assert_eq!(
        resolve_location(base, "s3://wildlife/processed"),
        "s3://wildlife/processed"
    );
    assert_eq!(resolve_location(base, "/srv/processed"), "/srv/processed");
    assert_eq!(
        PathBuf::from(resolve_location(base, "./processed")),
        base.join("processed")
    );
}

#[test]
fn test_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let args = global(&["-p", &dir.path().display().to_string()]);
    let err = load_config(&args).unwrap_err();
    assert!(format!("{err:#}").contains("[H001]"));
}

#[test]
fn test_partial_report_sets_exit_code() {
    use herd_db::{FileFailure, MergeTarget};

    let ok = MergeReport::new(MergeTarget::Harvest);
    assert!(exit_status(std::slice::from_ref(&ok)).is_ok());

    let mut partial = MergeReport::new(MergeTarget::Harvest);
    partial.files_failed.push(FileFailure {
        path: "x.parquet".to_string(),
        reason: "unreadable".to_string(),
    });
    let err = exit_status(&[ok, partial]).unwrap_err();
    assert_eq!(err.downcast_ref::<ExitCode>().map(|c| c.0), Some(EXIT_PARTIAL));
}

#[test]
fn test_column_widths_cover_header_and_cells() {
    let widths = calculate_column_widths(
        &["ID", "TARGET"],
        &[vec!["12".to_string(), "herd_population".to_string()]],
    );
    assert_eq!(widths, vec![2, 15]);
}
