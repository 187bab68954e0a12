//! herd-db - DuckDB store for the herd statistics pipeline
//!
//! Owns the durable side of the pipeline: the production and staging schema
//! (as embedded migrations), extract discovery and inspection, the staging
//! loader, the population and harvest mergers, and the merge-run ledger.
//! [`Pipeline`] ties these together into the restartable operations the CLI
//! exposes.

mod batch;
pub mod connection;
pub mod ddl;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod merge;
pub mod migration;
pub mod pipeline;
pub mod query;
mod remote;
pub mod report;
pub(crate) mod row_helpers;
pub mod staging;

#[cfg(test)]
mod test_fixtures;

pub use connection::HerdDb;
pub use error::{StoreError, StoreResult};
pub use extract::{ExtractAudit, ExtractFile};
pub use ledger::MergeRun;
pub use pipeline::Pipeline;
pub use report::{FileFailure, MergeReport, MergeTarget, RunStatus, SkipCounts};
