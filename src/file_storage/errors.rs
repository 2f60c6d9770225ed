//! # Blob Store Errors

use thiserror::Error;

/// Result type for blob store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob store errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// No blob stored under this name
    #[error("File not found: {0}")]
    NotFound(String),

    /// Key is not a flat, visible file name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Write did not complete (disk full, permission denied, ...)
    #[error("Failed to write {name}: {reason}")]
    WriteFailed { name: String, reason: String },

    /// Read failed for a reason other than absence
    #[error("Failed to read {name}: {reason}")]
    ReadFailed { name: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::NotFound(_) => 404,
            StorageError::InvalidKey(_) => 400,
            StorageError::WriteFailed { .. } => 500,
            StorageError::ReadFailed { .. } => 500,
            StorageError::Internal(_) => 500,
        }
    }
}
