//! Run reports returned by every pipeline operation.

use herd_core::PopulationLineage;
use std::fmt;

/// The table a run writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeTarget {
    /// Staging load only
    Staging(PopulationLineage),
    /// Staging load (optional) followed by a production merge
    Population(PopulationLineage),
    Harvest,
}

impl MergeTarget {
    /// Name of the table written last
    pub fn table(self) -> &'static str {
        match self {
            MergeTarget::Staging(lineage) => lineage.staging_table(),
            MergeTarget::Population(lineage) => lineage.production_table(),
            MergeTarget::Harvest => "harvest",
        }
    }
}

impl fmt::Display for MergeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Outcome recorded in the run ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Success,
    /// Completed, but some extract files were rejected
    Partial,
    Error,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::Error => "error",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extract file that contributed nothing to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Rows that did not reach their target, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Extract rows missing a key column
    pub malformed_rows: usize,
    /// Staged rows failing their lineage's identity or range checks
    pub invalid_records: usize,
    /// Staged rows with a null, empty, or sentinel unit list
    pub no_units: usize,
    /// Staged rows whose unit list was rejected outright
    pub rejected_unit_lists: usize,
    /// Individual unit-list members that did not parse
    pub dropped_units: usize,
}

impl SkipCounts {
    /// Rows skipped in total. Dropped members are not rows and are excluded.
    pub fn total(&self) -> usize {
        self.malformed_rows + self.invalid_records + self.no_units + self.rejected_unit_lists
    }

    pub(crate) fn absorb(&mut self, other: SkipCounts) {
        self.malformed_rows += other.malformed_rows;
        self.invalid_records += other.invalid_records;
        self.no_units += other.no_units;
        self.rejected_unit_lists += other.rejected_unit_lists;
        self.dropped_units += other.dropped_units;
    }
}

/// Summary of one stage or merge run.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub target: MergeTarget,
    /// Extract files read into the run
    pub files_loaded: Vec<String>,
    /// Extract files rejected before the write
    pub files_failed: Vec<FileFailure>,
    /// Rows read from extract files
    pub rows_read: usize,
    /// Rows written to staging
    pub rows_staged: usize,
    /// Distinct production keys written
    pub rows_merged: usize,
    pub skipped: SkipCounts,
}

impl MergeReport {
    pub fn new(target: MergeTarget) -> Self {
        Self {
            target,
            files_loaded: Vec::new(),
            files_failed: Vec::new(),
            rows_read: 0,
            rows_staged: 0,
            rows_merged: 0,
            skipped: SkipCounts::default(),
        }
    }

    pub fn status(&self) -> RunStatus {
        if self.files_failed.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }
}
