//! # Blob Store Trait

use super::errors::{StorageError, StorageResult};

/// Flat key/value store for file bytes.
///
/// Keys are stored names: single path components, never hidden.
/// The store itself enforces no size limit.
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Write bytes under `name`, replacing any previous blob
    fn put(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Read the blob stored under `name`
    fn get(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Check whether a blob exists
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Sorted snapshot of every stored name
    fn list(&self) -> StorageResult<Vec<String>>;
}

/// Reject keys that would escape the flat namespace or collide with
/// in-flight temporary files.
pub fn validate_key(name: &str) -> StorageResult<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if bad {
        return Err(StorageError::InvalidKey(name.to_string()));
    }
    Ok(())
}
