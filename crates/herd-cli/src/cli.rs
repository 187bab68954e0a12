//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// herd - Stage and merge wildlife population and harvest extracts
#[derive(Parser, Debug)]
#[command(name = "herd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the extract root (local directory or s3:// URI)
    #[arg(long, global = true, env = "HERD_SOURCE_ROOT")]
    pub source_root: Option<String>,

    /// Override the DuckDB database path
    #[arg(long, global = true, env = "HERD_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write herd.yml if absent and create the database schema
    Init(InitArgs),

    /// Load the latest extracts into a staging table
    Stage(StageArgs),

    /// Merge extracts into the production tables
    Merge(MergeArgs),

    /// List extract files that would be rejected, without loading anything
    Audit(AuditArgs),

    /// Show recent stage and merge runs
    Runs(RunsArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name written to a new herd.yml
    #[arg(short, long, default_value = "herd")]
    pub name: String,
}

/// Population lineages
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineageArg {
    /// Jurisdiction/species extracts into `population`
    Population,
    /// Herd-keyed extracts into `herd_population`
    Legacy,
}

/// Arguments for the stage command
#[derive(Args, Debug)]
pub struct StageArgs {
    /// Lineage to stage
    #[arg(value_enum, default_value = "population")]
    pub lineage: LineageArg,
}

/// Merge targets
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeTargetArg {
    /// Jurisdiction/species population
    Population,
    /// Herd-keyed legacy population
    Legacy,
    /// Unit-granular harvest
    Harvest,
    /// Population, legacy (when configured), then harvest
    All,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// What to merge
    #[arg(value_enum)]
    pub target: MergeTargetArg,

    /// Merge current staging contents without reloading extracts
    #[arg(long)]
    pub no_stage: bool,
}

/// Extract lineages for audit
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKindArg {
    Population,
    Legacy,
    Harvest,
}

/// Arguments for the audit command
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Lineage to audit (default: every configured lineage)
    #[arg(value_enum)]
    pub kind: Option<AuditKindArg>,
}

/// Arguments for the runs command
#[derive(Args, Debug)]
pub struct RunsArgs {
    /// Number of runs to show
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
