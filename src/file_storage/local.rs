//! # Local Filesystem Blob Store
//!
//! One file per blob in a single flat directory. Writes land in a hidden
//! temporary file first and are renamed into place, so readers and
//! listings never observe a partially written blob.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::backend::{validate_key, BlobStore};
use super::errors::{StorageError, StorageResult};

/// Local filesystem blob store
#[derive(Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::WriteFailed {
            name: root.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { root })
    }

    /// Directory holding the blobs
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn write_temp(path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        file.sync_all()
    }
}

impl BlobStore for LocalBlobStore {
    fn put(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        validate_key(name)?;

        let temp_path = self.root.join(format!(".{}.partial", Uuid::new_v4()));
        let result = Self::write_temp(&temp_path, data)
            .and_then(|_| fs::rename(&temp_path, self.full_path(name)));

        result.map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::WriteFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn get(&self, name: &str) -> StorageResult<Vec<u8>> {
        validate_key(name)?;

        fs::read(self.full_path(name)).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                StorageError::ReadFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_key(name)?;
        Ok(self.full_path(name).is_file())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| StorageError::ReadFailed {
            name: self.root.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::ReadFailed {
                name: self.root.display().to_string(),
                reason: e.to_string(),
            })?;

            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_key(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
