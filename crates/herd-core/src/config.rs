//! Configuration types and parsing for herd.yml

use crate::error::{CoreError, CoreResult};
use crate::extract::ExtractKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Special database path that opens an in-memory store
pub const IN_MEMORY_DB: &str = ":memory:";

/// Main project configuration from herd.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Root of the processed extract tree (local directory or `s3://` URI)
    #[serde(default)]
    pub source_root: String,

    /// Target database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Extract glob patterns, relative to `source_root`
    #[serde(default)]
    pub extracts: ExtractConfig,

    /// Staging refresh policy per population lineage
    #[serde(default)]
    pub staging: StagingConfig,

    /// What to do with extract files that cannot be read
    #[serde(default)]
    pub on_load_error: LoadErrorPolicy,

    /// Object-store settings used when `source_root` is remote
    #[serde(default)]
    pub s3: S3Config,
}

/// Target database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Glob patterns locating each extract lineage under `source_root`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// Jurisdiction/species population extracts (`<state>/<species>/population/<year>/*.parquet`)
    #[serde(default = "default_population_glob")]
    pub population: String,

    /// Harvest extracts (`<state>/<species>/harvest/<season>/<year>/*.parquet`)
    #[serde(default = "default_harvest_glob")]
    pub harvest: String,

    /// Herd-keyed legacy population extracts; the legacy lineage is disabled when unset
    #[serde(default)]
    pub legacy_population: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            population: default_population_glob(),
            harvest: default_harvest_glob(),
            legacy_population: None,
        }
    }
}

/// Staging refresh policies, one per population lineage
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagingConfig {
    /// Policy for `staging.population`
    #[serde(default = "default_full_refresh")]
    pub population: RefreshPolicy,

    /// Policy for `staging.herd_population`
    #[serde(default = "default_merge")]
    pub legacy_population: RefreshPolicy,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            population: RefreshPolicy::FullRefresh,
            legacy_population: RefreshPolicy::Merge,
        }
    }
}

/// How a staging table is refreshed from the latest extract set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Clear the staging table, then load every extract file
    FullRefresh,
    /// Keep existing rows; rows sharing a natural key are replaced
    Merge,
}

impl std::fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshPolicy::FullRefresh => write!(f, "full_refresh"),
            RefreshPolicy::Merge => write!(f, "merge"),
        }
    }
}

/// Handling of extract files that fail inspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadErrorPolicy {
    /// Report the file and continue with the rest of the extract set
    #[default]
    Skip,
    /// Fail the run before anything is written
    Abort,
}

/// Object-store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3Config {
    /// Region; falls back to `AWS_REGION`, then `us-east-1`
    #[serde(default)]
    pub region: Option<String>,

    /// `path` or `vhost`
    #[serde(default = "default_url_style")]
    pub url_style: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: None,
            url_style: default_url_style(),
        }
    }
}

/// The two population staging/production lineages that coexist during the
/// migration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopulationLineage {
    /// Keyed by (state, species, year, gmu)
    Jurisdiction,
    /// Legacy shape keyed by (herd_name, year, gmu)
    Herd,
}

impl PopulationLineage {
    /// Extract contract feeding this lineage
    pub fn extract_kind(self) -> ExtractKind {
        match self {
            PopulationLineage::Jurisdiction => ExtractKind::Population,
            PopulationLineage::Herd => ExtractKind::HerdPopulation,
        }
    }

    /// Staging table name
    pub fn staging_table(self) -> &'static str {
        match self {
            PopulationLineage::Jurisdiction => "staging.population",
            PopulationLineage::Herd => "staging.herd_population",
        }
    }

    /// Production table name
    pub fn production_table(self) -> &'static str {
        match self {
            PopulationLineage::Jurisdiction => "population",
            PopulationLineage::Herd => "herd_population",
        }
    }
}

impl std::fmt::Display for PopulationLineage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PopulationLineage::Jurisdiction => write!(f, "population"),
            PopulationLineage::Herd => write!(f, "herd_population"),
        }
    }
}

fn default_db_path() -> String {
    "./data/database/herd_data.duckdb".to_string()
}

fn default_population_glob() -> String {
    "**/population/*/*.parquet".to_string()
}

fn default_harvest_glob() -> String {
    "**/harvest/*/*/*.parquet".to_string()
}

fn default_full_refresh() -> RefreshPolicy {
    RefreshPolicy::FullRefresh
}

fn default_merge() -> RefreshPolicy {
    RefreshPolicy::Merge
}

fn default_url_style() -> String {
    "path".to_string()
}

impl Config {
    /// Build a config from the two externally supplied locations, with every
    /// other setting at its default.
    pub fn from_locations(name: &str, source_root: &str, database_path: &str) -> Self {
        Self {
            name: name.to_string(),
            source_root: source_root.to_string(),
            database: DatabaseConfig {
                path: database_path.to_string(),
            },
            extracts: ExtractConfig::default(),
            staging: StagingConfig::default(),
            on_load_error: LoadErrorPolicy::default(),
            s3: S3Config::default(),
        }
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for herd.yml or herd.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("herd.yml");
        let yaml_path = dir.join("herd.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: dir.join("herd.yml").display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        let patterns = [
            ("extracts.population", Some(&self.extracts.population)),
            ("extracts.harvest", Some(&self.extracts.harvest)),
            (
                "extracts.legacy_population",
                self.extracts.legacy_population.as_ref(),
            ),
        ];
        for (field, pattern) in patterns {
            let Some(pattern) = pattern else { continue };
            if pattern.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("{field} cannot be empty"),
                });
            }
            if pattern.starts_with('/') || pattern.contains("://") {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{field} must be relative to source_root, got '{pattern}'"
                    ),
                });
            }
        }

        if !matches!(self.s3.url_style.as_str(), "path" | "vhost") {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "s3.url_style must be 'path' or 'vhost', got '{}'",
                    self.s3.url_style
                ),
            });
        }

        Ok(())
    }

    /// Check that both externally supplied locations are present.
    ///
    /// Kept apart from [`validate`](Self::validate) because either location may
    /// be supplied after the file is loaded (command line or environment).
    pub fn require_locations(&self) -> CoreResult<()> {
        if self.source_root.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "source_root must be set (in herd.yml, --source-root, or HERD_SOURCE_ROOT)"
                    .to_string(),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Whether the extract tree lives in an object store
    pub fn is_remote_source(&self) -> bool {
        is_remote_uri(&self.source_root)
    }

    /// Whether the target database is in-memory
    pub fn is_in_memory_db(&self) -> bool {
        self.database.path == IN_MEMORY_DB
    }

    /// Full glob for an extract lineage, or `None` when the lineage has no
    /// configured source.
    pub fn extract_glob(&self, kind: ExtractKind) -> Option<String> {
        let pattern = match kind {
            ExtractKind::Population => Some(self.extracts.population.as_str()),
            ExtractKind::Harvest => Some(self.extracts.harvest.as_str()),
            ExtractKind::HerdPopulation => self.extracts.legacy_population.as_deref(),
        }?;
        let root = self.source_root.trim_end_matches('/');
        Some(format!("{}/{}", root, pattern.trim_start_matches("./")))
    }

    /// Staging refresh policy for a population lineage
    pub fn refresh_policy(&self, lineage: PopulationLineage) -> RefreshPolicy {
        match lineage {
            PopulationLineage::Jurisdiction => self.staging.population,
            PopulationLineage::Herd => self.staging.legacy_population,
        }
    }
}

/// Whether a location is an object-store URI rather than a local path
pub fn is_remote_uri(location: &str) -> bool {
    ["s3://", "s3a://", "s3n://"]
        .iter()
        .any(|scheme| location.starts_with(scheme))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
