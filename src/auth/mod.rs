//! # Auth Module
//!
//! Credential storage, per-client access sessions, and the bearer-token
//! session registry used by the HTTP surface.

pub mod credentials;
pub mod crypto;
pub mod errors;
pub mod session;

pub use credentials::{
    validate_username, CredentialStore, InMemoryCredentialStore, JsonFileCredentialStore,
};
pub use errors::{AuthError, AuthResult};
pub use session::{AccessSession, Identity, SessionRegistry, SessionState, DEFAULT_SESSION_TTL_SECS};
