//! Observability module for the Tharstern client.
//!
//! Provides logging setup and the redaction used on request and response
//! traces.

mod logging;

pub use logging::{log_request, log_response, redact, LogFormat, LogLevel, LoggingConfig};
