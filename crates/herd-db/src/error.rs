//! Error types for the herd store.

use thiserror::Error;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open or create the database (S001).
    #[error("[S001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Schema migration failed (S002).
    #[error("[S002] Database migration failed: {0}")]
    MigrationError(String),

    /// SQL execution error (S003).
    #[error("[S003] Database query failed: {0}")]
    QueryError(String),

    /// Transaction management error (S004).
    #[error("[S004] Database transaction failed: {0}")]
    TransactionError(String),

    /// Extract files were rejected under `on_load_error: abort` (S005).
    #[error("[S005] Load of {target} aborted: {failed} extract file(s) rejected")]
    LoadAborted { target: String, failed: usize },

    /// No extract pattern is configured for a lineage (S006).
    #[error("[S006] No extract pattern configured for {0}")]
    NoExtractSource(String),

    /// Remote source setup failed (S007).
    #[error("[S007] Remote source setup failed: {0}")]
    RemoteError(String),

    /// DuckDB driver error with preserved source chain (S008).
    #[error("[S008] DuckDB error")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

impl From<duckdb::Error> for StoreError {
    fn from(err: duckdb::Error) -> Self {
        StoreError::DuckDb(err)
    }
}
