//! # Storage Naming
//!
//! Stored names embed their own provenance:
//!
//! ```text
//! <uploader>_<YYYYMMDDHHMMSS>_<original name>
//! ```
//!
//! Two uploads collide only when the same user uploads the same file name
//! within the same second; the later write wins.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::errors::{ShareError, ShareResult};
use crate::auth::Identity;
use crate::file_storage::validate_key;

/// Separates uploader, timestamp and original name
pub const DELIMITER: char = '_';

/// Second-resolution timestamp embedded in stored names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TIMESTAMP_LEN: usize = 14;

/// Reduce a client-supplied file name to a single safe path component.
///
/// Leading directories (either separator style) are dropped; whatever is
/// left must be a real file name.
pub fn sanitize_original_name(original_name: &str) -> ShareResult<String> {
    let base = original_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    if base.is_empty() || base == "." || base == ".." || base.chars().any(|c| c.is_control()) {
        return Err(ShareError::InvalidFileName(original_name.to_string()));
    }

    Ok(base.to_string())
}

/// Build the stored name for an upload
pub fn derive_stored_name(
    uploader: &str,
    original_name: &str,
    now: DateTime<Utc>,
) -> ShareResult<String> {
    let original_name = sanitize_original_name(original_name)?;
    let stored_name = format!(
        "{}{}{}{}{}",
        uploader,
        DELIMITER,
        now.format(TIMESTAMP_FORMAT),
        DELIMITER,
        original_name
    );

    check_stored_name(&stored_name)?;
    Ok(stored_name)
}

/// Uploader embedded in a stored name (everything before the first `_`)
pub fn uploader_from_stored_name(stored_name: &str) -> ShareResult<Identity> {
    match stored_name.split_once(DELIMITER) {
        Some((uploader, _)) if !uploader.is_empty() => Ok(uploader.to_string()),
        _ => Err(ShareError::MalformedName(stored_name.to_string())),
    }
}

/// Ensure a name can live in the flat blob namespace
pub fn check_stored_name(stored_name: &str) -> ShareResult<()> {
    validate_key(stored_name).map_err(|_| ShareError::MalformedName(stored_name.to_string()))
}

/// Provenance recovered from a stored name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredNameParts {
    pub uploader: Identity,
    /// `None` if the middle segment is not a timestamp
    pub uploaded_at: Option<DateTime<Utc>>,
    pub original_name: String,
}

/// Split a stored name into uploader, upload time and original name
pub fn parse_stored_name(stored_name: &str) -> ShareResult<StoredNameParts> {
    let uploader = uploader_from_stored_name(stored_name)?;
    let rest = &stored_name[uploader.len() + DELIMITER.len_utf8()..];

    let timestamped = rest.split_once(DELIMITER).and_then(|(stamp, name)| {
        if stamp.len() != TIMESTAMP_LEN {
            return None;
        }
        NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|ts| (ts.and_utc(), name))
    });

    Ok(match timestamped {
        Some((uploaded_at, name)) => StoredNameParts {
            uploader,
            uploaded_at: Some(uploaded_at),
            original_name: name.to_string(),
        },
        None => StoredNameParts {
            uploader,
            uploaded_at: None,
            original_name: rest.to_string(),
        },
    })
}
