use craftlog_core::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate document id: {0}")]
    Duplicate(Uuid),

    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id.to_string()),
            StoreError::InvalidFilter(msg) => AppError::Validation(msg),
            other => AppError::Persistence(other.to_string()),
        }
    }
}
