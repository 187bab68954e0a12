//! herd-core - Core library for the herd statistics pipeline
//!
//! This crate provides the shared types used by every stage of the pipeline:
//! project configuration, staged and production record shapes, the
//! game-management-unit list normalizer, and the column contracts that each
//! extract lineage must satisfy.

pub mod config;
pub mod error;
pub mod extract;
pub mod gmu_list;
pub mod record;
pub mod sql_utils;

pub use config::{Config, LoadErrorPolicy, PopulationLineage, RefreshPolicy};
pub use error::{CoreError, CoreResult};
pub use extract::{ColumnSpec, ExtractKind, ResolvedColumns};
pub use gmu_list::{
    explode, Exploded, GmuId, RejectReason, UnitEncoding, UnitExplode, UnitList, UnitListPolicy,
};
pub use record::{
    HarvestRecord, PopulationKey, PopulationRecord, RecordDefect, StagedPopulationRecord,
};
