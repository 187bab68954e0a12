//! Init command implementation - writes herd.yml and creates the schema

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common;

const DEFAULT_SOURCE_ROOT: &str = "./data/processed";
const DEFAULT_DATABASE: &str = "./data/database/herd_data.duckdb";

/// Execute the init command
pub(crate) fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    if args.name.trim().is_empty() {
        anyhow::bail!("Project name cannot be empty");
    }

    let project_dir = Path::new(&global.project_dir);
    let config_path = match &global.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => project_dir.join("herd.yml"),
    };

    // Locations written into a new herd.yml are read back from it, relative
    // to its directory.
    let mut global = global.clone();
    if config_path.exists() || project_dir.join("herd.yaml").exists() {
        println!("  - {} already exists, leaving it in place", config_path.display());
    } else {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let source_root = global.source_root.as_deref().unwrap_or(DEFAULT_SOURCE_ROOT);
        let database = global.database.as_deref().unwrap_or(DEFAULT_DATABASE);
        fs::write(&config_path, config_template(&args.name, source_root, database))
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("  ✓ Created {}", config_path.display());
        global.source_root = None;
        global.database = None;
    }

    let config = common::load_config(&global)?;
    let db = common::open_db(&config)?;
    println!(
        "  ✓ Database ready at {} (schema version {})",
        config.database.path,
        db.schema_version()?
    );
    Ok(())
}

fn config_template(name: &str, source_root: &str, database: &str) -> String {
    let quote = |s: &str| s.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"name: "{name}"

# Processed extract tree (local directory or s3:// URI)
source_root: "{source_root}"

database:
  path: "{database}"

extracts:
  population: "**/population/*/*.parquet"
  harvest: "**/harvest/*/*/*.parquet"
  # legacy_population: "**/herd_population/*/*.parquet"

staging:
  population: full_refresh
  legacy_population: merge

# skip: reject unreadable files and merge the rest
# abort: fail the run before writing anything
on_load_error: skip
"#,
        name = quote(name),
        source_root = quote(source_root),
        database = quote(database),
    )
}
