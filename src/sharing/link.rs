//! # Share Link Codec
//!
//! A share token is the URL-safe base64 encoding (with padding) of a stored
//! name. It is an obfuscation, not a credential: there is no signature, no
//! expiry, and anyone holding a token can decode it.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};

use super::errors::{ShareError, ShareResult};
use super::naming::check_stored_name;

/// Encode a stored name as a share token
pub fn encode(stored_name: &str) -> String {
    URL_SAFE.encode(stored_name.as_bytes())
}

/// Decode a share token back to the stored name it was made from
pub fn decode(token: &str) -> ShareResult<String> {
    let invalid = || ShareError::InvalidToken(token.to_string());

    let bytes = URL_SAFE.decode(token.as_bytes()).map_err(|_| invalid())?;
    let stored_name = String::from_utf8(bytes).map_err(|_| invalid())?;

    // encode() is only ever applied to valid stored names
    check_stored_name(&stored_name).map_err(|_| invalid())?;

    Ok(stored_name)
}

/// Builds shareable download links
#[derive(Debug, Clone)]
pub struct LinkCodec {
    base_url: String,
}

impl LinkCodec {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Path component of the base URL; the route that must serve share links
    pub fn path(&self) -> &str {
        let rest = match self.base_url.find("://") {
            Some(i) => &self.base_url[i + 3..],
            None => self.base_url.as_str(),
        };
        let rest = match rest.find(|c: char| c == '?' || c == '#') {
            Some(i) => &rest[..i],
            None => rest,
        };
        match rest.find('/') {
            Some(i) => &rest[i..],
            None => "/",
        }
    }

    /// Link that resolves `token` without logging in
    pub fn share_url(&self, token: &str) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}file={}", self.base_url, separator, token)
    }

    /// Encode `stored_name` and build its link
    pub fn link_for(&self, stored_name: &str) -> String {
        self.share_url(&encode(stored_name))
    }
}
