//! Merge command implementation

use anyhow::Result;
use herd_core::PopulationLineage;
use herd_db::{MergeReport, MergeTarget, Pipeline, StoreResult};

use crate::cli::{GlobalArgs, MergeArgs, MergeTargetArg};
use crate::commands::common::{self, ExitCode};

/// Execute the merge command
pub(crate) fn execute(args: &MergeArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let db = common::open_db(&config)?;
    let pipeline = Pipeline::new(&db, &config);

    let targets = match args.target {
        MergeTargetArg::Population => vec![MergeTarget::Population(PopulationLineage::Jurisdiction)],
        MergeTargetArg::Legacy => vec![MergeTarget::Population(PopulationLineage::Herd)],
        MergeTargetArg::Harvest => vec![MergeTarget::Harvest],
        MergeTargetArg::All => {
            let mut targets = vec![MergeTarget::Population(PopulationLineage::Jurisdiction)];
            if config.extracts.legacy_population.is_some() {
                targets.push(MergeTarget::Population(PopulationLineage::Herd));
            }
            targets.push(MergeTarget::Harvest);
            targets
        }
    };

    // A single target fails the command directly; with several, each runs
    // regardless of the others and failures are summarised at the end.
    if let [target] = targets.as_slice() {
        println!("Merging {target}\n");
        let report = run(&pipeline, *target, args.no_stage)?;
        common::print_report(&report);
        return common::exit_status(std::slice::from_ref(&report));
    }

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for target in targets {
        println!("Merging {target}");
        match run(&pipeline, target, args.no_stage) {
            Ok(report) => {
                common::print_report(&report);
                reports.push(report);
            }
            Err(err) => {
                println!("  ✗ {target} - {err}");
                failures.push(target);
            }
        }
        println!();
    }

    if !failures.is_empty() {
        let names: Vec<String> = failures.iter().map(|t| t.to_string()).collect();
        eprintln!("Failed: {}", names.join(", "));
        return Err(ExitCode(1).into());
    }
    common::exit_status(&reports)
}

fn run(pipeline: &Pipeline<'_>, target: MergeTarget, no_stage: bool) -> StoreResult<MergeReport> {
    match target {
        MergeTarget::Population(lineage) if no_stage => pipeline.merge_staged(lineage),
        MergeTarget::Population(lineage) => pipeline.merge_population(lineage),
        MergeTarget::Staging(lineage) => pipeline.stage(lineage),
        MergeTarget::Harvest => pipeline.merge_harvest(),
    }
}
