//! Observability subsystem
//!
//! - Structured JSON logging of typed lifecycle events
//! - Append-only upload/download audit trail
//!
//! Observability failures never fail the operation being observed.
//!
//! # Usage
//!
//! ```ignore
//! use sharebox::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::FileUploaded, &[("uploader", "alice")]);
//! ```

pub mod audit;
mod events;
mod logger;

pub use audit::{AuditEvent, AuditEventKind, AuditSink, FileAuditLog, MemoryAuditLog};
pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    if event.is_fatal() {
        Logger::fatal(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::BootStart);
        log_event(Event::BootComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("storage_dir", "/tmp/test")]);
    }
}
