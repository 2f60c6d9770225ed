//! CLI command implementations
//!
//! Boot order for `serve`:
//! 1. Configuration load
//! 2. Blob store, audit log and credential store open
//! 3. Seed users registered
//! 4. HTTP server started

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::auth::{AuthError, CredentialStore, InMemoryCredentialStore, JsonFileCredentialStore, SessionRegistry};
use crate::config::ShareConfig;
use crate::file_storage::{BlobStore, LocalBlobStore};
use crate::http_server::{AppState, HttpServer};
use crate::observability::{log_event, log_event_with_fields, AuditSink, Event, FileAuditLog};
use crate::sharing::{link, parse_stored_name, FileEntry, LinkCodec, ShareService};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Storage directory written into a freshly created config
const DEFAULT_STORAGE_DIR: &str = "./uploaded_files";

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
        Command::List { config } => list(&config),
        Command::Encode { stored_name } => encode(&stored_name),
        Command::Decode { token } => decode(&token),
    }
}

/// Create the storage directory, writing a default config first if none exists
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = if config_path.exists() {
        ShareConfig::load(config_path)?
    } else {
        let config = ShareConfig::new(DEFAULT_STORAGE_DIR);
        config.save(config_path)?;
        config
    };

    if config.storage_dir.is_dir() {
        return Err(CliError::already_initialized(&config.storage_dir));
    }

    fs::create_dir_all(&config.storage_dir).map_err(|e| {
        CliError::io_error(format!(
            "Failed to create directory {}: {}",
            config.storage_dir.display(),
            e
        ))
    })?;

    write_response(json!({
        "initialized": true,
        "config": config_path.display().to_string(),
        "storage_dir": config.storage_dir.display().to_string(),
    }))
}

/// Boot and serve HTTP until interrupted
pub fn serve(config_path: &Path) -> CliResult<()> {
    log_event(Event::BootStart);

    let (config, state) = match boot(config_path) {
        Ok(booted) => booted,
        Err(e) => {
            log_event_with_fields(
                Event::BootFailed,
                &[("code", e.code_str()), ("message", e.message())],
            );
            return Err(e);
        }
    };

    let server = HttpServer::with_config(config.http.clone(), Arc::new(state));
    log_event(Event::BootComplete);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Print every stored file with its uploader
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = ShareConfig::load(config_path)?;
    let store = open_store(&config)?;
    let links = LinkCodec::new(config.base_url.as_str());

    let names = store
        .list()
        .map_err(|e| CliError::io_error(e.to_string()))?;

    let files: Vec<_> = names
        .into_iter()
        .map(|name| {
            let link = links.link_for(&name);
            let entry = FileEntry::from_stored_name(name);
            json!({
                "stored_name": entry.stored_name,
                "uploader": entry.uploader,
                "uploaded_at": entry.uploaded_at,
                "original_name": entry.original_name,
                "link": link,
            })
        })
        .collect();

    write_response(json!({ "total": files.len(), "files": files }))
}

/// Print the share token for a stored name
pub fn encode(stored_name: &str) -> CliResult<()> {
    crate::sharing::naming::check_stored_name(stored_name)?;
    write_response(json!({ "stored_name": stored_name, "token": link::encode(stored_name) }))
}

/// Print the stored name behind a share token
pub fn decode(token: &str) -> CliResult<()> {
    let stored_name = link::decode(token)?;
    let parts = parse_stored_name(&stored_name).ok();

    write_response(json!({
        "stored_name": stored_name,
        "uploader": parts.as_ref().map(|p| p.uploader.clone()),
        "uploaded_at": parts.as_ref().and_then(|p| p.uploaded_at),
        "original_name": parts.map(|p| p.original_name),
    }))
}

/// Open every subsystem named by the config
pub fn boot(config_path: &Path) -> CliResult<(ShareConfig, AppState)> {
    let config = ShareConfig::load(config_path)?;
    let storage_dir = config.storage_dir.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("storage_dir", storage_dir.as_str())]);

    let store = open_store(&config)?;
    let audit = open_audit_log(&config)?;
    let credentials = open_credentials(&config)?;

    let sessions = SessionRegistry::new(credentials).with_ttl(config.http.session_ttl());
    seed_users(&config, &sessions)?;

    let service = ShareService::new(store, audit, LinkCodec::new(config.base_url.as_str()))
        .with_max_upload_bytes(config.max_upload_bytes);

    Ok((config, AppState::new(service, sessions)))
}

fn open_store(config: &ShareConfig) -> CliResult<LocalBlobStore> {
    LocalBlobStore::open(&config.storage_dir)
        .map_err(|e| CliError::boot_failed(format!("Failed to open storage: {}", e)))
}

fn open_audit_log(config: &ShareConfig) -> CliResult<Arc<dyn AuditSink>> {
    if let Some(parent) = config.audit_log.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let log = FileAuditLog::open(&config.audit_log).map_err(|e| {
        CliError::boot_failed(format!(
            "Failed to open audit log {}: {}",
            config.audit_log.display(),
            e
        ))
    })?;
    Ok(Arc::new(log))
}

fn open_credentials(config: &ShareConfig) -> CliResult<Arc<dyn CredentialStore>> {
    match &config.credentials_file {
        Some(path) => {
            let store = JsonFileCredentialStore::open(path)
                .map_err(|e| CliError::boot_failed(e.to_string()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryCredentialStore::new())),
    }
}

fn seed_users(config: &ShareConfig, sessions: &SessionRegistry) -> CliResult<()> {
    for (username, password) in &config.seed_users {
        match sessions.register(username, password) {
            Ok(()) | Err(AuthError::DuplicateUsername) => {}
            Err(e) => {
                return Err(CliError::boot_failed(format!(
                    "Failed to seed user '{}': {}",
                    username, e
                )))
            }
        }
    }
    Ok(())
}
