//! Database connection wrapper.
//!
//! [`HerdDb`] owns a DuckDB [`Connection`] and provides helpers for opening,
//! migrating, and transacting against the herd database. A handle is acquired
//! once per run and passed explicitly to every stage of the pipeline.

use crate::error::{StoreError, StoreResult};
use crate::migration::{current_version, run_migrations};
use crate::remote::configure_s3;
use duckdb::Connection;
use herd_core::Config;
use std::path::Path;

/// Wrapper around a DuckDB connection to the production database.
///
/// Single-threaded: the pipeline assumes one writer per table for the
/// duration of a run.
pub struct HerdDb {
    conn: Connection,
}

impl HerdDb {
    /// Open (or create) the database at `path` and run pending migrations.
    ///
    /// Missing parent directories are created.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::ConnectionError(format!("{e}: {}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| StoreError::ConnectionError(format!("{e}: {}", path.display())))?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database with all migrations applied.
    pub fn open_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open the database named by `config`, preparing remote access when the
    /// extract root is an object-store URI.
    pub fn for_config(config: &Config) -> StoreResult<Self> {
        let db = if config.is_in_memory_db() {
            Self::open_memory()?
        } else {
            Self::open(Path::new(&config.database.path))?
        };
        if config.is_remote_source() {
            configure_s3(db.conn(), &config.s3)?;
        }
        Ok(db)
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Highest applied migration version.
    pub fn schema_version(&self) -> StoreResult<i32> {
        current_version(&self.conn)
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    pub fn transaction<F, T>(&self, body: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| StoreError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = body(&self.conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(StoreError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
        }
        result
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
