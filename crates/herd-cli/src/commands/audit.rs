//! Audit command implementation - vet extract files without loading them

use anyhow::Result;
use herd_core::ExtractKind;
use herd_db::Pipeline;

use crate::cli::{AuditArgs, AuditKindArg, GlobalArgs};
use crate::commands::common::{self, ExitCode, EXIT_PARTIAL};

/// Execute the audit command
pub(crate) fn execute(args: &AuditArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let db = common::open_db(&config)?;
    let pipeline = Pipeline::new(&db, &config);

    let kinds = match args.kind {
        Some(AuditKindArg::Population) => vec![ExtractKind::Population],
        Some(AuditKindArg::Legacy) => vec![ExtractKind::HerdPopulation],
        Some(AuditKindArg::Harvest) => vec![ExtractKind::Harvest],
        None => [
            ExtractKind::Population,
            ExtractKind::HerdPopulation,
            ExtractKind::Harvest,
        ]
        .into_iter()
        .filter(|kind| config.extract_glob(*kind).is_some())
        .collect(),
    };

    let mut rejected = 0;
    for kind in kinds {
        let audit = pipeline.audit(kind)?;
        println!("{} ({})", audit.kind, audit.pattern);
        if audit.accepted.is_empty() && audit.rejected.is_empty() {
            println!("  - no files matched");
        }
        for file in &audit.accepted {
            println!("  ✓ {}", file.path);
        }
        for failure in &audit.rejected {
            println!("  ✗ {} - {}", failure.path, failure.reason);
        }
        println!();
        rejected += audit.rejected.len();
    }

    if rejected > 0 {
        println!("{rejected} file(s) would be rejected");
        return Err(ExitCode(EXIT_PARTIAL).into());
    }
    Ok(())
}
