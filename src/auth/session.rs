//! # Session Management
//!
//! Per-client access sessions and the registry the HTTP layer keeps them in.
//!
//! A session is either anonymous or authenticated as exactly one identity.
//! Anonymous sessions may only resolve share links; upload and listing
//! require `require_identity()` to succeed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use super::credentials::{validate_username, CredentialStore};
use super::crypto::{generate_token, hash_token};
use super::errors::{AuthError, AuthResult};
use crate::observability::{log_event_with_fields, Event, Logger};

/// A registered username
pub type Identity = String;

/// Authentication state of one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Identity),
}

impl SessionState {
    /// Returns the state name string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "ANONYMOUS",
            SessionState::Authenticated(_) => "AUTHENTICATED",
        }
    }
}

/// Access session for a single client connection
#[derive(Clone)]
pub struct AccessSession {
    state: SessionState,
    credentials: Arc<dyn CredentialStore>,
}

impl fmt::Debug for AccessSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessSession")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AccessSession {
    /// Create an anonymous session over the given credential store
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            state: SessionState::Anonymous,
            credentials,
        }
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Authenticated identity, if any
    pub fn identity(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    /// Identity for operations that need a logged-in user
    pub fn require_identity(&self) -> AuthResult<&str> {
        self.identity().ok_or(AuthError::AuthenticationRequired)
    }

    /// Log in. On failure the current state is left untouched.
    pub fn login(&mut self, username: &str, password: &str) -> AuthResult<()> {
        if !self.credentials.verify(username, password)? {
            Logger::warn(Event::LoginFailed.as_str(), &[("username", username)]);
            return Err(AuthError::InvalidCredentials);
        }

        self.state = SessionState::Authenticated(username.to_string());
        log_event_with_fields(Event::LoginSucceeded, &[("username", username)]);
        Ok(())
    }

    /// Register a new user. Does not log in.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        validate_username(username)?;
        self.credentials.register(username, password)?;
        log_event_with_fields(Event::UserRegistered, &[("username", username)]);
        Ok(())
    }

    /// Log out, returning to anonymous
    pub fn logout(&mut self) {
        if let SessionState::Authenticated(identity) = &self.state {
            log_event_with_fields(Event::Logout, &[("username", identity.as_str())]);
        }
        self.state = SessionState::Anonymous;
    }
}

/// Default lifetime of a bearer-token session
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Registered session with its expiry
#[derive(Debug, Clone)]
struct SessionEntry {
    session: AccessSession,
    expires_at: DateTime<Utc>,
}

/// Authenticated sessions keyed by opaque bearer token.
///
/// Only SHA-256 hashes of tokens are held; the raw token is returned to
/// the client once at login. Expired entries are refused on lookup and
/// pruned on every login.
pub struct SessionRegistry {
    credentials: Arc<dyn CredentialStore>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS as i64),
        }
    }

    /// Override the session lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh anonymous session sharing this registry's credential store
    pub fn anonymous(&self) -> AccessSession {
        AccessSession::new(self.credentials.clone())
    }

    /// Register through an anonymous session
    pub fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        self.anonymous().register(username, password)
    }

    /// Log in and return the raw bearer token for the new session
    pub fn login(&self, username: &str, password: &str) -> AuthResult<String> {
        self.login_at(username, password, Utc::now())
    }

    /// Log in at an explicit time
    pub fn login_at(&self, username: &str, password: &str, now: DateTime<Utc>) -> AuthResult<String> {
        let mut session = self.anonymous();
        session.login(username, password)?;

        let token = generate_token();
        let mut sessions = self.sessions.write().map_err(|_| {
            AuthError::StorageError("Lock poisoned".to_string())
        })?;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            hash_token(&token),
            SessionEntry {
                session,
                expires_at: now + self.ttl,
            },
        );
        Ok(token)
    }

    /// Snapshot of the session behind a bearer token
    pub fn session(&self, token: &str) -> AuthResult<AccessSession> {
        self.session_at(token, Utc::now())
    }

    /// Session lookup at an explicit time; expired tokens are refused
    pub fn session_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<AccessSession> {
        let sessions = self.sessions.read().map_err(|_| {
            AuthError::StorageError("Lock poisoned".to_string())
        })?;

        match sessions.get(&hash_token(token)) {
            Some(entry) if entry.expires_at > now => Ok(entry.session.clone()),
            _ => Err(AuthError::AuthenticationRequired),
        }
    }

    /// Identity behind a bearer token
    pub fn identity(&self, token: &str) -> AuthResult<Identity> {
        let session = self.session(token)?;
        let identity = session.require_identity()?.to_string();
        Ok(identity)
    }

    /// End the session behind a bearer token
    pub fn logout(&self, token: &str) -> AuthResult<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().map_err(|_| {
            AuthError::StorageError("Lock poisoned".to_string())
        })?;

        let mut entry = sessions
            .remove(&hash_token(token))
            .filter(|entry| entry.expires_at > now)
            .ok_or(AuthError::AuthenticationRequired)?;
        entry.session.logout();
        Ok(())
    }

    /// Drop every session expired at `now`, returning how many were removed
    pub fn prune_expired(&self, now: DateTime<Utc>) -> AuthResult<usize> {
        let mut sessions = self.sessions.write().map_err(|_| {
            AuthError::StorageError("Lock poisoned".to_string())
        })?;

        let len_before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        Ok(len_before - sessions.len())
    }

    /// Number of held sessions, expired or not
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::InMemoryCredentialStore;

    fn store() -> Arc<dyn CredentialStore> {
        Arc::new(
            InMemoryCredentialStore::with_users([("user1", "password1"), ("user2", "password2")])
                .unwrap(),
        )
    }

    #[test]
    fn test_new_session_is_anonymous() {
        let session = AccessSession::new(store());

        assert_eq!(session.state(), &SessionState::Anonymous);
        assert!(matches!(session.require_identity(), Err(AuthError::AuthenticationRequired)));
    }

    #[test]
    fn test_login_logout() {
        let mut session = AccessSession::new(store());

        session.login("user1", "password1").unwrap();
        assert_eq!(session.identity(), Some("user1"));
        assert_eq!(session.state().as_str(), "AUTHENTICATED");

        session.logout();
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_failed_login_stays_anonymous() {
        let mut session = AccessSession::new(store());

        for _ in 0..2 {
            let result = session.login("bob", "wrong");
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
            assert_eq!(session.state(), &SessionState::Anonymous);
        }
    }

    #[test]
    fn test_failed_relogin_keeps_identity() {
        let mut session = AccessSession::new(store());
        session.login("user1", "password1").unwrap();

        assert!(session.login("user2", "nope").is_err());
        assert_eq!(session.identity(), Some("user1"));

        session.login("user2", "password2").unwrap();
        assert_eq!(session.identity(), Some("user2"));
    }

    #[test]
    fn test_register_does_not_authenticate() {
        let mut session = AccessSession::new(store());

        session.register("alice", "pw").unwrap();
        assert!(!session.is_authenticated());

        session.login("alice", "pw").unwrap();
        assert_eq!(session.identity(), Some("alice"));
    }

    #[test]
    fn test_register_duplicate_and_invalid() {
        let session = AccessSession::new(store());

        assert!(matches!(
            session.register("user1", "x"),
            Err(AuthError::DuplicateUsername)
        ));
        assert!(matches!(
            session.register("bad_name", "x"),
            Err(AuthError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_registry_tokens() {
        let registry = SessionRegistry::new(store());

        let token = registry.login("user1", "password1").unwrap();
        assert_eq!(registry.identity(&token).unwrap(), "user1");
        assert_eq!(registry.len(), 1);

        assert!(matches!(
            registry.identity("bogus"),
            Err(AuthError::AuthenticationRequired)
        ));

        registry.logout(&token).unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.identity(&token),
            Err(AuthError::AuthenticationRequired)
        ));
        assert!(registry.logout(&token).is_err());
    }

    #[test]
    fn test_registry_failed_login_creates_no_session() {
        let registry = SessionRegistry::new(store());

        assert!(matches!(
            registry.login("user1", "bad"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_expired_token_refused() {
        let registry = SessionRegistry::new(store()).with_ttl(Duration::minutes(30));
        let t0 = Utc::now();

        let token = registry.login_at("user1", "password1", t0).unwrap();
        assert!(registry.session_at(&token, t0 + Duration::minutes(29)).is_ok());
        assert!(matches!(
            registry.session_at(&token, t0 + Duration::minutes(30)),
            Err(AuthError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_registry_prunes_expired_sessions() {
        let registry = SessionRegistry::new(store()).with_ttl(Duration::minutes(30));
        let t0 = Utc::now();

        registry.login_at("user1", "password1", t0).unwrap();
        registry.login_at("user2", "password2", t0).unwrap();
        assert_eq!(registry.len(), 2);

        // A later login sweeps out the expired entries
        let fresh = registry
            .login_at("user1", "password1", t0 + Duration::hours(1))
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.session_at(&fresh, t0 + Duration::hours(1)).is_ok());

        assert_eq!(registry.prune_expired(t0 + Duration::hours(2)).unwrap(), 1);
        assert!(registry.is_empty());
    }
}
