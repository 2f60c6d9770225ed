//! # Credential Store
//!
//! Username to password-hash mapping behind an injected trait, so the
//! session layer never touches ambient global state. Secrets are kept as
//! Argon2id hashes only.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::crypto::{hash_password, verify_password};
use super::errors::{AuthError, AuthResult};

/// Longest accepted username
pub const MAX_USERNAME_LEN: usize = 64;

/// Check that a username can be embedded in a stored name and
/// recovered from it unchanged.
pub fn validate_username(username: &str) -> AuthResult<()> {
    let reason = if username.is_empty() {
        Some("must not be empty")
    } else if username.chars().count() > MAX_USERNAME_LEN {
        Some("too long")
    } else if username.contains('_') {
        Some("must not contain '_'")
    } else if username.contains('/') || username.contains('\\') {
        Some("must not contain path separators")
    } else if username.starts_with('.') {
        Some("must not start with '.'")
    } else if username.chars().any(|c| c.is_control()) {
        Some("must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(AuthError::InvalidUsername(format!("{}: {}", username, reason))),
        None => Ok(()),
    }
}

/// Credential store trait
pub trait CredentialStore: Send + Sync {
    /// Check if a username is already registered
    fn contains(&self, username: &str) -> AuthResult<bool>;

    /// Add a new user; fails with `DuplicateUsername` if present
    fn register(&self, username: &str, password: &str) -> AuthResult<()>;

    /// Check a username/password pair; unknown users verify as false
    fn verify(&self, username: &str, password: &str) -> AuthResult<bool>;
}

/// Username to hash table shared by the store implementations
#[derive(Debug, Default)]
struct PasswordTable {
    users: RwLock<BTreeMap<String, String>>,
}

impl PasswordTable {
    fn from_map(users: BTreeMap<String, String>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    fn contains(&self, username: &str) -> AuthResult<bool> {
        let users = self.users.read().map_err(|_| {
            AuthError::StorageError("Lock poisoned".to_string())
        })?;
        Ok(users.contains_key(username))
    }

    /// Insert a new user, then hand the updated table to `persist`.
    /// The insert is undone if `persist` fails.
    fn register<F>(&self, username: &str, password: &str, persist: F) -> AuthResult<()>
    where
        F: FnOnce(&BTreeMap<String, String>) -> AuthResult<()>,
    {
        let hash = hash_password(password)?;

        let mut users = self.users.write().map_err(|_| {
            AuthError::StorageError("Lock poisoned".to_string())
        })?;

        if users.contains_key(username) {
            return Err(AuthError::DuplicateUsername);
        }

        users.insert(username.to_string(), hash);
        if let Err(e) = persist(&users) {
            users.remove(username);
            return Err(e);
        }
        Ok(())
    }

    fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
        let hash = {
            let users = self.users.read().map_err(|_| {
                AuthError::StorageError("Lock poisoned".to_string())
            })?;
            users.get(username).cloned()
        };

        match hash {
            Some(hash) => verify_password(password, &hash),
            None => Ok(false),
        }
    }
}

/// In-memory credential store, reset on every process start
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    table: PasswordTable,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given users
    pub fn with_users<'a, I>(users: I) -> AuthResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let store = Self::new();
        for (username, password) in users {
            store.register(username, password)?;
        }
        Ok(store)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn contains(&self, username: &str) -> AuthResult<bool> {
        self.table.contains(username)
    }

    fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        self.table.register(username, password, |_| Ok(()))
    }

    fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
        self.table.verify(username, password)
    }
}

/// Credential store persisted as a JSON object of username to hash.
///
/// The whole file is rewritten through a temporary file and a rename on
/// every registration.
#[derive(Debug)]
pub struct JsonFileCredentialStore {
    path: PathBuf,
    table: PasswordTable,
}

impl JsonFileCredentialStore {
    /// Open the store, loading existing users if the file exists
    pub fn open(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref().to_path_buf();

        let users = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| AuthError::StorageError(format!("Failed to read credentials: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| AuthError::StorageError(format!("Invalid credentials file: {}", e)))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            table: PasswordTable::from_map(users),
        })
    }

    /// Get the credentials file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, users: &BTreeMap<String, String>) -> AuthResult<()> {
        let json = serde_json::to_string_pretty(users)
            .map_err(|e| AuthError::StorageError(e.to_string()))?;

        let temp_path = self.path.with_extension("json.partial");
        fs::write(&temp_path, json)
            .and_then(|_| fs::rename(&temp_path, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp_path);
                AuthError::StorageError(format!("Failed to write credentials: {}", e))
            })
    }
}

impl CredentialStore for JsonFileCredentialStore {
    fn contains(&self, username: &str) -> AuthResult<bool> {
        self.table.contains(username)
    }

    fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        self.table
            .register(username, password, |users| self.persist(users))
    }

    fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
        self.table.verify(username, password)
    }
}
