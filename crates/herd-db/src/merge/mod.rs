//! Production mergers.
//!
//! - [`population`] explodes staged population rows into per-unit rows
//! - [`harvest`] upserts unit-granular harvest extracts directly
//!
//! Both are last-write-wins upserts keyed by the production table's primary
//! key and expect to run inside one transaction per run.

pub mod harvest;
pub mod population;

pub use harvest::{merge_harvest, HarvestMerge};
pub use population::{merge_population, read_staged, PopulationMerge};
