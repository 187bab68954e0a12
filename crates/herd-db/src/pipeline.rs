//! Restartable pipeline operations.
//!
//! Each operation discovers and vets its extract files outside any
//! transaction, writes inside one transaction, and is recorded in the run
//! ledger whether it commits or not. Every write path is an upsert or a full
//! refresh, so any operation can be re-run safely.

use crate::connection::HerdDb;
use crate::error::{StoreError, StoreResult};
use crate::extract::{self, ExtractAudit, ExtractFile};
use crate::ledger;
use crate::merge::{harvest, population};
use crate::report::{MergeReport, MergeTarget};
use crate::staging::{self, StagingLoad};
use herd_core::{Config, ExtractKind, LoadErrorPolicy, PopulationLineage};

/// Pipeline operations over one database handle and project config
pub struct Pipeline<'a> {
    db: &'a HerdDb,
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(db: &'a HerdDb, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Inspect every extract file for `kind` without loading anything.
    pub fn audit(&self, kind: ExtractKind) -> StoreResult<ExtractAudit> {
        let pattern = self
            .config
            .extract_glob(kind)
            .ok_or_else(|| StoreError::NoExtractSource(kind.to_string()))?;
        extract::audit(self.db.conn(), kind, &pattern)
    }

    /// Load the latest extracts for `lineage` into its staging table.
    pub fn stage(&self, lineage: PopulationLineage) -> StoreResult<MergeReport> {
        let target = MergeTarget::Staging(lineage);
        self.record(target, || {
            let mut report = MergeReport::new(target);
            let files = self.collect(lineage.extract_kind(), &mut report)?;
            let policy = self.config.refresh_policy(lineage);
            let load = self
                .db
                .transaction(|conn| staging::load_staging(conn, lineage, policy, &files))?;
            absorb_load(&mut report, &load);
            Ok(report)
        })
    }

    /// Stage the latest extracts for `lineage`, then merge staging into its
    /// production table. Both steps commit together or not at all.
    pub fn merge_population(&self, lineage: PopulationLineage) -> StoreResult<MergeReport> {
        let target = MergeTarget::Population(lineage);
        self.record(target, || {
            let mut report = MergeReport::new(target);
            let files = self.collect(lineage.extract_kind(), &mut report)?;
            let policy = self.config.refresh_policy(lineage);
            let (load, merge) = self.db.transaction(|conn| {
                let load = staging::load_staging(conn, lineage, policy, &files)?;
                let merge = population::merge_population(conn, lineage)?;
                Ok((load, merge))
            })?;
            absorb_load(&mut report, &load);
            report.rows_merged = merge.keys_written;
            report.skipped.absorb(merge.skipped);
            Ok(report)
        })
    }

    /// Merge the current staging contents for `lineage` without reloading.
    pub fn merge_staged(&self, lineage: PopulationLineage) -> StoreResult<MergeReport> {
        let target = MergeTarget::Population(lineage);
        self.record(target, || {
            let mut report = MergeReport::new(target);
            let merge = self
                .db
                .transaction(|conn| population::merge_population(conn, lineage))?;
            report.rows_read = merge.staged_rows;
            report.rows_merged = merge.keys_written;
            report.skipped.absorb(merge.skipped);
            Ok(report)
        })
    }

    /// Upsert the latest harvest extracts into `harvest`.
    pub fn merge_harvest(&self) -> StoreResult<MergeReport> {
        let target = MergeTarget::Harvest;
        self.record(target, || {
            let mut report = MergeReport::new(target);
            let files = self.collect(ExtractKind::Harvest, &mut report)?;
            let merge = self
                .db
                .transaction(|conn| harvest::merge_harvest(conn, &files))?;
            report.rows_read = merge.rows_read;
            report.rows_merged = merge.rows_merged;
            report.skipped.malformed_rows = merge.malformed_rows;
            Ok(report)
        })
    }

    /// Vet the extract set for `kind`, noting rejections on `report`.
    ///
    /// Under `on_load_error: abort` any rejection fails the run here, before
    /// anything is written.
    fn collect(&self, kind: ExtractKind, report: &mut MergeReport) -> StoreResult<Vec<ExtractFile>> {
        let audit = self.audit(kind)?;
        if !audit.rejected.is_empty() && self.config.on_load_error == LoadErrorPolicy::Abort {
            return Err(StoreError::LoadAborted {
                target: report.target.to_string(),
                failed: audit.rejected.len(),
            });
        }
        report.files_loaded = audit.accepted.iter().map(|f| f.path.clone()).collect();
        report.files_failed = audit.rejected;
        Ok(audit.accepted)
    }

    fn record<F>(&self, target: MergeTarget, body: F) -> StoreResult<MergeReport>
    where
        F: FnOnce() -> StoreResult<MergeReport>,
    {
        let conn = self.db.conn();
        let run_id = ledger::begin_run(conn, target)?;
        log::debug!("Run {run_id}: {target}");

        match body() {
            Ok(report) => {
                ledger::complete_run(conn, run_id, &report)?;
                log::info!(
                    "Run {run_id} {}: {target} ({} file(s) loaded, {} failed)",
                    report.status(),
                    report.files_loaded.len(),
                    report.files_failed.len()
                );
                Ok(report)
            }
            Err(err) => {
                if let Err(ledger_err) = ledger::fail_run(conn, run_id, &err.to_string()) {
                    log::warn!("Could not record failure of run {run_id}: {ledger_err}");
                }
                Err(err)
            }
        }
    }
}

fn absorb_load(report: &mut MergeReport, load: &StagingLoad) {
    report.rows_read = load.rows_read;
    report.rows_staged = load.rows_staged;
    report.skipped.malformed_rows = load.malformed_rows;
}
