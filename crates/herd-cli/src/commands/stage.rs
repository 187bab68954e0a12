//! Stage command implementation

use anyhow::Result;
use herd_core::PopulationLineage;
use herd_db::Pipeline;

use crate::cli::{GlobalArgs, StageArgs};
use crate::commands::common;

/// Execute the stage command
pub(crate) fn execute(args: &StageArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let db = common::open_db(&config)?;
    let lineage = PopulationLineage::from(args.lineage);

    println!(
        "Staging {} ({})\n",
        lineage.staging_table(),
        config.refresh_policy(lineage)
    );
    let report = Pipeline::new(&db, &config).stage(lineage)?;
    common::print_report(&report);
    common::exit_status(std::slice::from_ref(&report))
}
