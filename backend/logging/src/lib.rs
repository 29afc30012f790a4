//! Telemetry for ScriptScan.
//!
//! Subscriber setup, secret redaction, and the structured analysis event stream.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{AnalysisEvent, EVENT_TARGET, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
