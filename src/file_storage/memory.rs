//! # In-Memory Blob Store

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::backend::{validate_key, BlobStore};
use super::errors::{StorageError, StorageResult};

/// In-memory blob store for testing
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        validate_key(name)?;
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StorageError::Internal("Lock poisoned".into()))?;
        blobs.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn get(&self, name: &str) -> StorageResult<Vec<u8>> {
        validate_key(name)?;
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StorageError::Internal("Lock poisoned".into()))?;
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_key(name)?;
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StorageError::Internal("Lock poisoned".into()))?;
        Ok(blobs.contains_key(name))
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StorageError::Internal("Lock poisoned".into()))?;
        Ok(blobs.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryBlobStore::new();

        store.put("bob_20240101000000_z.bin", b"zz").unwrap();
        store.put("alice_20240101000000_a.bin", b"aa").unwrap();

        assert_eq!(store.get("alice_20240101000000_a.bin").unwrap(), b"aa");
        assert!(store.exists("bob_20240101000000_z.bin").unwrap());
        assert_eq!(
            store.list().unwrap(),
            vec!["alice_20240101000000_a.bin", "bob_20240101000000_z.bin"]
        );
        assert!(matches!(store.get("nope"), Err(StorageError::NotFound(_))));
    }
}
