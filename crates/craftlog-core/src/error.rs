//! Error types module
//!
//! All fallible operations in craftlog surface an `AppError`. Callers get a
//! structured classification (`error_code`) instead of a raw internal fault.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] io::Error),

    #[error("Missing image dimensions: {0}")]
    MissingDimensions(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Persistence(format!("JSON serialization error: {}", err))
    }
}

impl AppError {
    /// Machine-readable error code (e.g. "FILESYSTEM_ERROR").
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Filesystem(_) => "FILESYSTEM_ERROR",
            AppError::MissingDimensions(_) => "MISSING_DIMENSIONS",
            AppError::ImageProcessing(_) => "IMAGE_PROCESSING_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Whether a retry of the same operation can reasonably succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Filesystem(_) | AppError::Persistence(_))
    }
}
