//! # Blob Storage
//!
//! Flat namespace of file blobs keyed by stored name.

pub mod backend;
pub mod errors;
pub mod local;
pub mod memory;

pub use backend::{validate_key, BlobStore};
pub use errors::{StorageError, StorageResult};
pub use local::LocalBlobStore;
pub use memory::InMemoryBlobStore;
