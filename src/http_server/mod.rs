//! # HTTP Server Module
//!
//! Axum API over the share service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/auth/*` - Register, login, logout, current user
//! - `/files` - Upload, list and download (bearer token required)
//! - `/share?file=<token>` - Anonymous share-link download, also served at the
//!   path of the configured base URL

pub mod auth_routes;
pub mod config;
pub mod errors;
pub mod file_routes;
pub mod server;
pub mod share_routes;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::ErrorResponse;
pub use server::HttpServer;
pub use share_routes::{check_share_path, SHARE_PATH};
pub use state::AppState;
