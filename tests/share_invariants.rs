//! Share Invariant Tests
//!
//! End-to-end behaviour of the share service over a real storage directory:
//! - Upload then link resolution returns the uploaded bytes
//! - Oversized uploads leave no blob behind
//! - Every successful upload and download is audited exactly once
//! - Failed logins leave the session anonymous and audit nothing

use std::fs;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sharebox::auth::{
    AccessSession, AuthError, CredentialStore, InMemoryCredentialStore, SessionState,
};
use sharebox::file_storage::{BlobStore, LocalBlobStore, StorageError};
use sharebox::observability::{AuditEventKind, AuditSink, FileAuditLog, MemoryAuditLog};
use sharebox::sharing::{link, uploader_from_stored_name, LinkCodec, ShareError, ShareService};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

struct Harness {
    _dir: TempDir,
    service: ShareService<LocalBlobStore>,
    audit: Arc<MemoryAuditLog>,
    credentials: Arc<dyn CredentialStore>,
}

fn harness(limit: u64) -> Harness {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = LocalBlobStore::open(dir.path().join("uploaded_files")).unwrap();
    let audit = Arc::new(MemoryAuditLog::new());
    let credentials: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());

    let service = ShareService::new(store, audit.clone(), LinkCodec::new("http://localhost:8501/"))
        .with_max_upload_bytes(limit);

    Harness {
        _dir: dir,
        service,
        audit,
        credentials,
    }
}

fn login(h: &Harness, username: &str, password: &str) -> AccessSession {
    let mut session = AccessSession::new(h.credentials.clone());
    session.login(username, password).unwrap();
    session
}

// =============================================================================
// Upload and link resolution
// =============================================================================

/// Register, log in, upload 500 bytes, resolve the link: one UPLOAD and one
/// DOWNLOAD event, both attributed to alice.
#[test]
fn test_alice_upload_and_link_download() {
    let h = harness(1024 * 1024 * 1024);

    let session = AccessSession::new(h.credentials.clone());
    session.register("alice", "pw").unwrap();
    let session = login(&h, "alice", "pw");

    let payload: Vec<u8> = (0..500u32).map(|i| (i % 251) as u8).collect();
    let receipt = h.service.upload(&session, "report.pdf", &payload).unwrap();

    assert!(receipt.stored_name.starts_with("alice_"));
    assert!(receipt.stored_name.ends_with("_report.pdf"));
    assert_eq!(receipt.size, 500);
    assert!(receipt.link.ends_with(&format!("?file={}", receipt.token)));

    let resolved = h.service.resolve_share_token(&receipt.token).unwrap();
    assert_eq!(resolved.data, payload);
    assert_eq!(resolved.stored_name, receipt.stored_name);

    let events = h.audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, AuditEventKind::Upload);
    assert_eq!(events[0].actor, "alice");
    assert_eq!(events[1].kind, AuditEventKind::Download);
    assert_eq!(events[1].actor, "alice");
    assert!(events.iter().all(|e| e.stored_name == receipt.stored_name));
}

/// The uploader is recoverable from every stored name, including original
/// filenames that contain the delimiter themselves.
#[test]
fn test_uploader_recoverable_from_stored_name() {
    let h = harness(1024);
    h.credentials.register("carol", "pw").unwrap();
    let session = login(&h, "carol", "pw");

    for original in ["plain.txt", "with_underscores_in_it.csv", "ünïcode.md"] {
        let receipt = h.service.upload(&session, original, b"x").unwrap();
        assert_eq!(uploader_from_stored_name(&receipt.stored_name).unwrap(), "carol");
    }
}

/// Stored name layout is uploader, second-resolution UTC timestamp, original name.
#[test]
fn test_stored_name_layout() {
    let h = harness(1024);
    h.credentials.register("alice", "pw").unwrap();
    let session = login(&h, "alice", "pw");

    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let receipt = h.service.upload_at(&session, "a.txt", b"1", at).unwrap();

    assert_eq!(receipt.stored_name, "alice_20240102030405_a.txt");
    assert_eq!(link::decode(&receipt.token).unwrap(), receipt.stored_name);
}

/// Same uploader, same name, same second: the second upload replaces the first.
#[test]
fn test_same_second_collision_is_last_writer_wins() {
    let h = harness(1024);
    h.credentials.register("alice", "pw").unwrap();
    let session = login(&h, "alice", "pw");

    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let first = h.service.upload_at(&session, "a.txt", b"first", at).unwrap();
    let second = h.service.upload_at(&session, "a.txt", b"second", at).unwrap();

    assert_eq!(first.token, second.token);
    assert_eq!(h.service.store().list().unwrap().len(), 1);
    assert_eq!(h.service.resolve_share_token(&first.token).unwrap().data, b"second");
}

// =============================================================================
// Size ceiling
// =============================================================================

/// One byte over the ceiling is rejected and nothing reaches the directory.
#[test]
fn test_ceiling_plus_one_creates_no_blob() {
    let h = harness(1024);
    h.credentials.register("alice", "pw").unwrap();
    let session = login(&h, "alice", "pw");

    let result = h.service.upload(&session, "big.bin", &vec![0u8; 1025]);
    assert!(matches!(
        result,
        Err(ShareError::SizeLimitExceeded { size: 1025, limit: 1024 })
    ));

    assert!(h.service.store().list().unwrap().is_empty());
    let on_disk = fs::read_dir(h.service.store().root()).unwrap().count();
    assert_eq!(on_disk, 0);
    assert!(h.audit.is_empty());

    // Exactly at the ceiling is accepted
    h.service.upload(&session, "fits.bin", &vec![0u8; 1024]).unwrap();
    assert_eq!(h.service.store().list().unwrap().len(), 1);
}

// =============================================================================
// Sessions
// =============================================================================

/// Two wrong passwords: both fail, the session stays anonymous, nothing is audited.
#[test]
fn test_bob_wrong_password_twice() {
    let h = harness(1024);
    h.credentials.register("bob", "right").unwrap();

    let mut session = AccessSession::new(h.credentials.clone());
    for _ in 0..2 {
        assert!(matches!(
            session.login("bob", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    assert!(matches!(
        h.service.upload(&session, "x.txt", b"x"),
        Err(ShareError::Auth(AuthError::AuthenticationRequired))
    ));
    assert!(h.audit.is_empty());
}

/// Registering an existing username fails and leaves the original credential intact.
#[test]
fn test_duplicate_registration() {
    let h = harness(1024);
    let session = AccessSession::new(h.credentials.clone());

    session.register("alice", "original").unwrap();
    assert!(matches!(
        session.register("alice", "other"),
        Err(AuthError::DuplicateUsername)
    ));

    assert!(h.credentials.verify("alice", "original").unwrap());
    assert!(!h.credentials.verify("alice", "other").unwrap());
}

/// Logging out returns to anonymous and revokes upload and listing.
#[test]
fn test_logout_revokes_access() {
    let h = harness(1024);
    h.credentials.register("alice", "pw").unwrap();
    let mut session = login(&h, "alice", "pw");

    assert!(h.service.list_files(&session).is_ok());
    session.logout();

    assert!(h.service.list_files(&session).is_err());
    assert!(h.service.upload(&session, "a.txt", b"a").is_err());
}

// =============================================================================
// Link resolution failures
// =============================================================================

#[test]
fn test_unknown_and_invalid_tokens() {
    let h = harness(1024);

    let ghost = link::encode("ghost_20240101000000_missing.txt");
    assert!(matches!(
        h.service.resolve_share_token(&ghost),
        Err(ShareError::Storage(StorageError::NotFound(_)))
    ));

    let escape = link::encode("../escape");
    for bad in ["%%%", "YWJj=", "", escape.as_str()] {
        assert!(
            matches!(h.service.resolve_share_token(bad), Err(ShareError::InvalidToken(_))),
            "token {:?} should be rejected",
            bad
        );
    }

    assert!(h.audit.is_empty());
}

#[test]
fn test_link_resolution_needs_no_session() {
    let h = harness(1024);
    h.credentials.register("alice", "pw").unwrap();
    let receipt = h
        .service
        .upload(&login(&h, "alice", "pw"), "shared.txt", b"hello")
        .unwrap();

    // Anyone holding the token can download; no session object is involved
    let resolved = h.service.resolve_share_token(&receipt.token).unwrap();
    assert_eq!(resolved.data, b"hello");
}

// =============================================================================
// Persistence
// =============================================================================

/// Blobs and audit records survive reopening.
#[test]
fn test_blobs_and_audit_persist() {
    let dir = TempDir::new().unwrap();
    let storage = dir.path().join("files");
    let audit_path = dir.path().join("audit.log");
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(InMemoryCredentialStore::with_users([("alice", "pw")]).unwrap());

    let token = {
        let audit: Arc<dyn AuditSink> = Arc::new(FileAuditLog::open(&audit_path).unwrap());
        let service = ShareService::new(
            LocalBlobStore::open(&storage).unwrap(),
            audit,
            LinkCodec::new("http://localhost:8501/"),
        );
        let mut session = AccessSession::new(credentials.clone());
        session.login("alice", "pw").unwrap();
        service.upload(&session, "keep.txt", b"kept").unwrap().token
    };

    let audit: Arc<dyn AuditSink> = Arc::new(FileAuditLog::open(&audit_path).unwrap());
    let service = ShareService::new(
        LocalBlobStore::open(&storage).unwrap(),
        audit,
        LinkCodec::new("http://localhost:8501/"),
    );
    assert_eq!(service.resolve_share_token(&token).unwrap().data, b"kept");

    let log = fs::read_to_string(&audit_path).unwrap();
    let kinds: Vec<String> = log
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["kind"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(kinds, vec!["UPLOAD", "DOWNLOAD"]);
}
