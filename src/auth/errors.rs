//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================

    /// Unknown user or wrong password (generic - don't leak which)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Username already registered
    #[error("Username already exists")]
    DuplicateUsername,

    /// Username cannot be embedded in a stored name
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    // ==================
    // Session Errors
    // ==================

    /// Operation requires a logged-in session
    #[error("Authentication required")]
    AuthenticationRequired,

    // ==================
    // Internal Errors
    // ==================

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Credential storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidUsername(_) => 400,

            AuthError::InvalidCredentials => 401,
            AuthError::AuthenticationRequired => 401,

            AuthError::DuplicateUsername => 409,

            AuthError::HashingFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
