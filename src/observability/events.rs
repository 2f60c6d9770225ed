//! Observable events
//!
//! Every log line carries one of these as its `event` key.

use std::fmt;

/// Observable events in sharebox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Startup complete, ready to serve
    BootComplete,
    /// Configuration loaded
    ConfigLoaded,
    /// Boot failed (FATAL)
    BootFailed,
    /// HTTP server listening
    Serving,

    // Accounts
    /// New user registered
    UserRegistered,
    /// Login succeeded
    LoginSucceeded,
    /// Login rejected
    LoginFailed,
    /// Session ended
    Logout,

    // Files
    /// Upload stored
    FileUploaded,
    /// Upload rejected before any write
    UploadRejected,
    /// File served to a client
    FileDownloaded,
    /// Share token could not be decoded
    TokenRejected,

    // Audit
    /// Audit sink refused a record
    AuditFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "SHAREBOX_STARTUP_BEGIN",
            Event::BootComplete => "SHAREBOX_STARTUP_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::BootFailed => "SHAREBOX_STARTUP_FAILED",
            Event::Serving => "SHAREBOX_SERVING",

            Event::UserRegistered => "USER_REGISTERED",
            Event::LoginSucceeded => "LOGIN_SUCCEEDED",
            Event::LoginFailed => "LOGIN_FAILED",
            Event::Logout => "LOGOUT",

            Event::FileUploaded => "FILE_UPLOADED",
            Event::UploadRejected => "UPLOAD_REJECTED",
            Event::FileDownloaded => "FILE_DOWNLOADED",
            Event::TokenRejected => "SHARE_TOKEN_REJECTED",

            Event::AuditFailed => "AUDIT_WRITE_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
