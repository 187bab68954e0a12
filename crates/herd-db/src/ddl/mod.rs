//! Embedded DDL migrations for the herd database.
//!
//! Each migration is a numbered `.sql` file embedded via `include_str!`.
//! The [`MIGRATIONS`] array is ordered by version number and consumed by
//! [`crate::migration::run_migrations`].

/// A single DDL migration.
pub struct Migration {
    /// Sequential version number (1-based).
    pub version: i32,
    /// Raw SQL to execute.
    pub sql: &'static str,
}

/// All known migrations, in order.
///
/// v001 is the herd-keyed lineage; v002 adds the jurisdiction/species/unit
/// lineage and harvest alongside it; v003 adds the run ledger.
pub static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("v001_herd_lineage.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("v002_jurisdiction_lineage.sql"),
    },
    Migration {
        version: 3,
        sql: include_str!("v003_merge_runs.sql"),
    },
];
