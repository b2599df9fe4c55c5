use thiserror::Error;

use crate::repository::RepositoryError;

pub mod generation;
pub mod import;
pub mod product_types;
pub mod templates;
pub mod validation;

/// Result type returned by the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by services to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    /// Malformed input that could not be interpreted at all.
    #[error("{0}")]
    Form(String),
    /// Structural problems found in one or more templates; every issue is kept.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// Imported templates lack a product type and no default was chosen.
    #[error("a default product type is required for: {}", .0.join(", "))]
    MissingProductType(Vec<String>),
    /// A sequential import stopped part way; earlier writes stay committed.
    #[error("import stopped at `{handle}` after {applied} records: {reason}")]
    ImportInterrupted {
        applied: usize,
        handle: String,
        reason: String,
        /// The failing write lost a stale-write check against a concurrent edit.
        conflict: bool,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}
