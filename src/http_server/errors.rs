//! HTTP error bodies
//!
//! Every failing handler answers with `{"error": ..., "code": ...}` and the
//! matching status.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::auth::AuthError;
use crate::sharing::ShareError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    pub fn new(code: u16, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<ShareError> for ErrorResponse {
    fn from(err: ShareError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

/// Build an error tuple from a status code and message
pub fn api_error(code: u16, error: impl Into<String>) -> ApiError {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(code, error)))
}

pub fn auth_error(err: AuthError) -> ApiError {
    let response = ErrorResponse::from(err);
    api_error(response.code, response.error)
}

pub fn share_error(err: ShareError) -> ApiError {
    let response = ErrorResponse::from(err);
    api_error(response.code, response.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_storage::StorageError;

    #[test]
    fn test_share_error_mapping() {
        let (status, Json(body)) = share_error(ShareError::from(StorageError::NotFound("x".into())));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, 404);

        let (status, _) = share_error(ShareError::SizeLimitExceeded { size: 2, limit: 1 });
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_auth_error_mapping() {
        let (status, Json(body)) = auth_error(AuthError::InvalidCredentials);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, AuthError::InvalidCredentials.to_string());
    }
}
