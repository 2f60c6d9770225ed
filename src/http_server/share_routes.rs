//! Share Link HTTP Routes
//!
//! Anonymous download through `?file=<token>`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::errors::{api_error, ApiError};
use super::file_routes::attachment;
use super::state::{run_blocking, AppState};

/// Fixed route for share links
pub const SHARE_PATH: &str = "/share";

/// Prefixes owned by the other routers
const RESERVED_PATHS: [&str; 3] = ["/health", "/auth", "/files"];

/// Share routes with shared state
///
/// Served at `/share` and at the path of the configured base URL, so every
/// link the service hands out resolves against this router.
pub fn share_routes(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route(SHARE_PATH, get(share_handler));

    let link_path = state.service.links().path().to_string();
    if link_path != SHARE_PATH && check_share_path(&link_path).is_ok() {
        router = router.route(&link_path, get(share_handler));
    }

    router.with_state(state)
}

/// Whether share links can be served at `path`
pub fn check_share_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err(format!("share path '{}' must start with '/'", path));
    }

    if path.contains(|c: char| matches!(c, ':' | '*' | '{' | '}')) {
        return Err(format!("share path '{}' contains route syntax", path));
    }

    let taken = RESERVED_PATHS
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{}/", p)));
    if taken {
        return Err(format!("share path '{}' collides with an API route", path));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    pub file: Option<String>,
}

async fn share_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShareQuery>,
) -> Result<(StatusCode, HeaderMap, Bytes), ApiError> {
    let token = query
        .file
        .ok_or_else(|| api_error(400, "Missing 'file' query parameter"))?;

    let file = run_blocking(&state, move |s| s.service.resolve_share_token(&token)).await?;
    Ok(attachment(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_share_path() {
        for ok in ["/", "/share", "/share/", "/dl", "/app/download"] {
            assert!(check_share_path(ok).is_ok(), "{}", ok);
        }
        for bad in ["", "share", "/files", "/files/x", "/auth/login", "/health", "/:token", "/d/*rest"] {
            assert!(check_share_path(bad).is_err(), "{}", bad);
        }
    }
}
