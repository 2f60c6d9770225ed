//! # Sharing
//!
//! Stored-name derivation, share-link encoding, and the service that ties
//! sessions, blob storage and auditing together.

pub mod errors;
pub mod link;
pub mod naming;
pub mod service;

pub use errors::{ShareError, ShareResult};
pub use link::LinkCodec;
pub use naming::{derive_stored_name, parse_stored_name, uploader_from_stored_name, StoredNameParts};
pub use service::{FileEntry, ResolvedFile, ShareService, UploadReceipt, DEFAULT_MAX_UPLOAD_BYTES};
