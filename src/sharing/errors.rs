//! # Sharing Errors

use thiserror::Error;

use crate::auth::AuthError;
use crate::file_storage::StorageError;

/// Result type for sharing operations
pub type ShareResult<T> = Result<T, ShareError>;

/// Errors surfaced by upload, listing and share-link resolution
#[derive(Debug, Clone, Error)]
pub enum ShareError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Stored name has no uploader prefix
    #[error("Malformed stored name: {0}")]
    MalformedName(String),

    /// Original filename is empty or a traversal component
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    /// Token is not the encoding of any stored name
    #[error("Invalid share token")]
    InvalidToken(String),

    #[error("File too large: {size} bytes (max: {limit})")]
    SizeLimitExceeded { size: u64, limit: u64 },
}

impl ShareError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ShareError::Auth(e) => e.status_code(),
            ShareError::Storage(e) => e.status_code(),
            ShareError::MalformedName(_) => 422,
            ShareError::InvalidFileName(_) => 400,
            ShareError::InvalidToken(_) => 400,
            ShareError::SizeLimitExceeded { .. } => 413,
        }
    }
}
