//! Logging configuration and utilities.
//!
//! Structured logging goes through the `tracing` crate. Anything that may
//! contain credentials passes through [`redact`] before it is emitted.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Longest body excerpt written to the log.
const MAX_LOGGED_BODY: usize = 1000;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The minimum log level to capture
    pub level: LogLevel,
    /// The output format for log messages
    pub format: LogFormat,
    /// Whether to include the module target in log output
    pub include_target: bool,
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose)
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging
    Info,
    /// Warning-level logging
    Warn,
    /// Error-level logging (least verbose)
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<LogLevel> for tracing::level_filters::LevelFilter {
    fn from(level: LogLevel) -> Self {
        Level::from(level).into()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format
    Json,
    /// Compact format
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include the module target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Initialize logging with this configuration.
    ///
    /// This should be called once at application startup; `RUST_LOG`
    /// directives are honoured on top of the configured level.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber has already been installed.
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::from_default_env()
            .add_directive(tracing::level_filters::LevelFilter::from(self.level).into());

        match self.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().with_target(self.include_target))
                    .try_init()?;
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json().with_target(self.include_target))
                    .try_init()?;
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact().with_target(self.include_target))
                    .try_init()?;
            }
        }

        Ok(())
    }
}

fn redaction_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"Basic [A-Za-z0-9+/=]+", "Basic ***"),
            (r"(?i)password=[^&\s]+", "password=***"),
            (r#""Token"\s*:\s*"[^"]*""#, r#""Token":"***""#),
            (r#""Content_Base64"\s*:\s*"[^"]*""#, r#""Content_Base64":"...""#),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
        .collect()
    })
}

/// Scrubs auth headers, passwords, issued tokens and attachment payloads.
pub fn redact(text: &str) -> String {
    let mut result = text.to_string();
    for (re, replacement) in redaction_rules() {
        result = re.replace_all(&result, *replacement).into_owned();
    }
    result
}

fn excerpt(body: &str) -> &str {
    if body.len() <= MAX_LOGGED_BODY {
        return body;
    }
    let mut end = MAX_LOGGED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Log an outgoing HTTP request for debugging.
pub fn log_request(summary: &str) {
    tracing::debug!(request = %redact(summary), "Outgoing request");
}

/// Log an incoming HTTP response for debugging.
pub fn log_response(status: u16, elapsed: Duration, body: &str) {
    let body = redact(body);
    tracing::debug!(
        status = status,
        duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        body = excerpt(&body),
        "Incoming response"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_target);
    }

    #[test]
    fn test_logging_config_builder_chain() {
        let config = LoggingConfig::new()
            .with_level(LogLevel::Trace)
            .with_format(LogFormat::Json)
            .with_target(false);

        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.include_target);
    }

    #[test]
    fn test_redact_authorization_and_password() {
        let redacted = redact("Authorization: Basic YWJjLWRlZg== ?email=a@b.c&password=s3cret&applicationId=x");
        assert!(!redacted.contains("YWJjLWRlZg=="));
        assert!(!redacted.contains("s3cret"));
        assert!(redacted.contains("Basic ***"));
        assert!(redacted.contains("password=***"));
        assert!(redacted.contains("applicationId=x"));
    }

    #[test]
    fn test_redact_issued_token() {
        let redacted = redact(r#"{"Details":{"Token": "6f1c2d3e-aaaa-bbbb-cccc-000011112222"}}"#);
        assert_eq!(redacted, r#"{"Details":{"Token":"***"}}"#);
    }

    #[test]
    fn test_redact_attachment_payload() {
        let redacted = redact(r#"{"OrderId":5,"Content_Base64":"SGVsbG8="}"#);
        assert!(!redacted.contains("SGVsbG8="));
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(MAX_LOGGED_BODY);
        let cut = excerpt(&body);
        assert!(cut.len() <= MAX_LOGGED_BODY);
        assert!(body.starts_with(cut));
    }

    #[test]
    fn test_log_helpers_do_not_panic() {
        log_request("GET http://mis/TharsternAPI/api/products?productCode=A4");
        log_response(200, Duration::from_millis(3), &"x".repeat(2000));
    }
}
