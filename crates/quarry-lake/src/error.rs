//! Lake error types.

use quarry_core::ServiceError;

const SERVICE: &str = "lake";

/// Errors raised by the local lake.
#[derive(Debug, thiserror::Error)]
pub enum LakeError {
    /// `DuckDB` operation failed.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error while preparing the database file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file name does not produce a usable relation name.
    #[error("Invalid table name derived from '{0}'")]
    InvalidTableName(String),

    /// The engine only runs SELECT statements.
    #[error("Refusing to execute a non-SELECT statement")]
    NotReadOnly,

    /// The blocking worker panicked or was cancelled.
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl From<LakeError> for ServiceError {
    fn from(error: LakeError) -> Self {
        match error {
            LakeError::NotReadOnly | LakeError::InvalidTableName(_) => Self::Malformed {
                service: SERVICE,
                reason: error.to_string(),
            },
            other => Self::Unavailable {
                service: SERVICE,
                reason: other.to_string(),
            },
        }
    }
}
