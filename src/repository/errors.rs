use diesel::r2d2::PoolError;
use thiserror::Error;

/// Result type returned by repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested record does not exist in the caller's hub.
    #[error("record not found")]
    NotFound,
    /// A compare-and-swap update found a newer version of the record.
    #[error("record was modified concurrently: {0}")]
    Conflict(String),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(diesel::result::Error),
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// A JSON column could not be encoded or decoded.
    #[error("malformed stored document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => RepositoryError::NotFound,
            other => RepositoryError::Database(other),
        }
    }
}
