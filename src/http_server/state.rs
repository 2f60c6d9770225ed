//! Shared handler state
//!
//! One `AppState` is shared by every router. Blocking work (argon2, file
//! I/O) is moved off the async executor with `run_blocking`.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::errors::{api_error, auth_error, share_error, ApiError};
use crate::auth::{AccessSession, AuthError, SessionRegistry};
use crate::file_storage::LocalBlobStore;
use crate::sharing::{ShareError, ShareService};

/// State shared across handlers
pub struct AppState {
    pub service: ShareService<LocalBlobStore>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(service: ShareService<LocalBlobStore>, sessions: SessionRegistry) -> Self {
        Self { service, sessions }
    }

    /// Session named by the request's bearer token
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Result<AccessSession, ApiError> {
        let token = bearer_token(headers)?;
        self.sessions.session(token).map_err(auth_error)
    }
}

/// Extract the `Authorization: Bearer` token
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| auth_error(AuthError::AuthenticationRequired))
}

/// Run a blocking closure on the blocking pool
pub async fn run_blocking<T, E, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ShareError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| api_error(500, format!("Worker task failed: {}", e)))?
        .map_err(|e| share_error(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        let (status, _) = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
