//! Auth HTTP Routes
//!
//! Registration, login and logout over bearer-token sessions.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::errors::{auth_error, ApiError};
use super::state::{bearer_token, run_blocking, AppState};

/// Auth routes with shared state
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub session_token: String,
}

// ==================
// Handlers
// ==================

/// Register handler
async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let username = request.username.clone();
    run_blocking(&state, move |s| {
        s.sessions.register(&request.username, &request.password)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse { username })))
}

/// Login handler
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = request.username.clone();
    let session_token = run_blocking(&state, move |s| {
        s.sessions.login(&request.username, &request.password)
    })
    .await?;

    Ok(Json(LoginResponse {
        username,
        session_token,
    }))
}

/// Logout handler
async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)?;
    state.sessions.logout(token).map_err(auth_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current user handler
async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let username = state.sessions.identity(token).map_err(auth_error)?;
    Ok(Json(UserResponse { username }))
}
