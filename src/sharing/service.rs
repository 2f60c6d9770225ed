//! # Share Service
//!
//! Upload, listing and download operations over a blob store.
//!
//! ## Invariants
//! - Oversized payloads are rejected before any write
//! - Every successful upload and download is audited exactly once
//! - Link resolution needs no session; everything else does

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::{ShareError, ShareResult};
use super::link::{self, LinkCodec};
use super::naming::{derive_stored_name, parse_stored_name, uploader_from_stored_name};
use crate::auth::{AccessSession, Identity};
use crate::file_storage::BlobStore;
use crate::observability::{log_event_with_fields, AuditEvent, AuditEventKind, AuditSink, Event, Logger};

/// Default upload ceiling: 1 GiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;

/// Result of a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub stored_name: String,
    pub token: String,
    pub link: String,
    pub size: u64,
}

/// One row of the file listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub stored_name: String,
    /// `None` for blobs placed out-of-band without an uploader prefix
    pub uploader: Option<Identity>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub original_name: Option<String>,
}

impl FileEntry {
    /// Describe a stored name; names without an uploader prefix keep only the name
    pub fn from_stored_name(stored_name: String) -> Self {
        match parse_stored_name(&stored_name) {
            Ok(parts) => Self {
                stored_name,
                uploader: Some(parts.uploader),
                uploaded_at: parts.uploaded_at,
                original_name: Some(parts.original_name),
            },
            Err(_) => Self {
                stored_name,
                uploader: None,
                uploaded_at: None,
                original_name: None,
            },
        }
    }
}

/// Bytes of a downloaded file
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub stored_name: String,
    pub data: Vec<u8>,
}

/// File sharing operations
pub struct ShareService<B: BlobStore> {
    store: B,
    audit: Arc<dyn AuditSink>,
    links: LinkCodec,
    max_upload_bytes: u64,
}

impl<B: BlobStore> ShareService<B> {
    /// Create a service with the default upload ceiling
    pub fn new(store: B, audit: Arc<dyn AuditSink>, links: LinkCodec) -> Self {
        Self {
            store,
            audit,
            links,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload ceiling
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn links(&self) -> &LinkCodec {
        &self.links
    }

    /// Upload a file as the session's user
    pub fn upload(
        &self,
        session: &AccessSession,
        original_name: &str,
        data: &[u8],
    ) -> ShareResult<UploadReceipt> {
        self.upload_at(session, original_name, data, Utc::now())
    }

    /// Upload with an explicit timestamp
    pub fn upload_at(
        &self,
        session: &AccessSession,
        original_name: &str,
        data: &[u8],
        now: DateTime<Utc>,
    ) -> ShareResult<UploadReceipt> {
        let uploader = session.require_identity()?;

        let size = data.len() as u64;
        let size_field = size.to_string();
        if size > self.max_upload_bytes {
            let limit_field = self.max_upload_bytes.to_string();
            Logger::warn(
                Event::UploadRejected.as_str(),
                &[
                    ("limit", limit_field.as_str()),
                    ("size", size_field.as_str()),
                    ("uploader", uploader),
                ],
            );
            return Err(ShareError::SizeLimitExceeded {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let stored_name = derive_stored_name(uploader, original_name, now)?;
        self.store.put(&stored_name, data)?;

        self.audit(AuditEvent::new(AuditEventKind::Upload, &stored_name, uploader, now));
        log_event_with_fields(
            Event::FileUploaded,
            &[
                ("size", size_field.as_str()),
                ("stored_name", stored_name.as_str()),
                ("uploader", uploader),
            ],
        );

        let token = link::encode(&stored_name);
        Ok(UploadReceipt {
            link: self.links.share_url(&token),
            stored_name,
            token,
            size,
        })
    }

    /// Every stored file with its uploader
    pub fn list_files(&self, session: &AccessSession) -> ShareResult<Vec<FileEntry>> {
        session.require_identity()?;

        let names = self.store.list()?;
        Ok(names.into_iter().map(FileEntry::from_stored_name).collect())
    }

    /// Download a file by name as the session's user
    pub fn download(&self, session: &AccessSession, stored_name: &str) -> ShareResult<ResolvedFile> {
        let downloader = session.require_identity()?;

        let data = self.store.get(stored_name)?;
        self.record_download(stored_name, downloader, "session");

        Ok(ResolvedFile {
            stored_name: stored_name.to_string(),
            data,
        })
    }

    /// Resolve a share token to the file it names. No session required.
    pub fn resolve_share_token(&self, token: &str) -> ShareResult<ResolvedFile> {
        let stored_name = link::decode(token).map_err(|e| {
            Logger::warn(Event::TokenRejected.as_str(), &[("token", token)]);
            e
        })?;

        let data = self.store.get(&stored_name)?;

        // The downloader is unknown; attribute the access to the owner, or to
        // the whole name for blobs placed without an uploader prefix
        let actor = uploader_from_stored_name(&stored_name).unwrap_or_else(|_| stored_name.clone());
        self.record_download(&stored_name, &actor, "link");

        Ok(ResolvedFile { stored_name, data })
    }

    /// Share link for an existing stored name
    pub fn link_for(&self, stored_name: &str) -> String {
        self.links.link_for(stored_name)
    }

    fn record_download(&self, stored_name: &str, actor: &str, via: &str) {
        self.audit(AuditEvent::new(
            AuditEventKind::Download,
            stored_name,
            actor,
            Utc::now(),
        ));
        log_event_with_fields(
            Event::FileDownloaded,
            &[("actor", actor), ("stored_name", stored_name), ("via", via)],
        );
    }

    fn audit(&self, event: AuditEvent) {
        // The blob operation already succeeded; report but do not undo it
        if let Err(e) = self.audit.record(&event) {
            let error = e.to_string();
            Logger::error(
                Event::AuditFailed.as_str(),
                &[
                    ("error", error.as_str()),
                    ("kind", event.kind.as_str()),
                    ("stored_name", event.stored_name.as_str()),
                ],
            );
        }
    }
}
