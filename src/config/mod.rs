//! Configuration module for the Tharstern client.
//!
//! Holds the service location and the credentials exchanged for an API
//! token. The service is addressed as `http://<host>:<port>/TharsternAPI/api`.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::errors::{TharsternError, TharsternResult};

/// Default service port.
pub const DEFAULT_PORT: u16 = 80;

/// Default request timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Path of the API below the host.
pub const API_ROOT: &str = "TharsternAPI/api";

/// Configuration for the Tharstern client.
#[derive(Clone)]
pub struct TharsternConfig {
    /// Service host name or address.
    pub host: String,
    /// Service port.
    pub port: u16,
    /// Account email used for the token exchange.
    pub username: String,
    /// Account password (stored securely).
    pub(crate) password: SecretString,
    /// Application id registered with the service.
    pub application_id: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl TharsternConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> TharsternConfigBuilder {
        TharsternConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `THARSTERN_HOST` (required): Service host
    /// - `THARSTERN_USERNAME` (required): Account email
    /// - `THARSTERN_PASSWORD` (required): Account password
    /// - `THARSTERN_APPLICATION_ID` (required): Application id
    /// - `THARSTERN_PORT` (optional): Service port
    /// - `THARSTERN_TIMEOUT` (optional): Request timeout in seconds
    pub fn from_env() -> TharsternResult<Self> {
        let mut builder = TharsternConfigBuilder::new()
            .host(required_env("THARSTERN_HOST")?)
            .username(required_env("THARSTERN_USERNAME")?)
            .password(required_env("THARSTERN_PASSWORD")?)
            .application_id(required_env("THARSTERN_APPLICATION_ID")?);

        if let Ok(port_str) = std::env::var("THARSTERN_PORT") {
            let port = port_str.parse::<u16>().map_err(|_| {
                TharsternError::configuration(format!("THARSTERN_PORT is not a valid port: {}", port_str))
            })?;
            builder = builder.port(port);
        }

        if let Ok(timeout_str) = std::env::var("THARSTERN_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        builder.build()
    }

    /// Returns the password (exposing the secret).
    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.port, API_ROOT)
    }
}

impl std::fmt::Debug for TharsternConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TharsternConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn required_env(name: &str) -> TharsternResult<String> {
    std::env::var(name)
        .map_err(|_| TharsternError::configuration(format!("{} environment variable not set", name)))
}

/// Builder for `TharsternConfig`.
#[derive(Default)]
pub struct TharsternConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    application_id: Option<String>,
    timeout: Option<Duration>,
}

impl TharsternConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the service port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the account email.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the account password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the application id.
    pub fn application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> TharsternResult<TharsternConfig> {
        let host = non_empty(self.host, "host")?;
        let username = non_empty(self.username, "username")?;
        let application_id = non_empty(self.application_id, "application id")?;
        let password = self
            .password
            .ok_or_else(|| TharsternError::configuration("password is required"))?;

        let config = TharsternConfig {
            host: host.trim_end_matches('/').to_string(),
            port: self.port.unwrap_or(DEFAULT_PORT),
            username,
            password: SecretString::new(password),
            application_id,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        };

        // Rejects hosts containing a scheme, path or other URL syntax.
        let parsed = url::Url::parse(&config.base_url())?;
        if parsed.host_str().is_none() || parsed.path() != format!("/{}", API_ROOT) {
            return Err(TharsternError::configuration(format!(
                "Invalid host: {}",
                config.host
            )));
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>, field: &str) -> TharsternResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(TharsternError::configuration(format!("{} cannot be empty", field))),
        None => Err(TharsternError::configuration(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TharsternConfigBuilder {
        TharsternConfig::builder()
            .host("mis.example.com")
            .username("ops@example.com")
            .password("hunter2")
            .application_id("web-shop")
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.password(), "hunter2");
    }

    #[test]
    fn test_base_url_layout() {
        let config = builder().port(8080).build().unwrap();
        assert_eq!(config.base_url(), "http://mis.example.com:8080/TharsternAPI/api");
    }

    #[test]
    fn test_base_url_default_port() {
        let config = builder().build().unwrap();
        assert_eq!(config.base_url(), "http://mis.example.com:80/TharsternAPI/api");
    }

    #[test]
    fn test_config_builder_missing_fields() {
        assert!(TharsternConfig::builder().build().is_err());
        assert!(builder().host("").build().is_err());
        assert!(builder().application_id("  ").build().is_err());
        assert!(TharsternConfig::builder()
            .host("mis")
            .username("ops")
            .application_id("app")
            .build()
            .is_err());
    }

    #[test]
    fn test_config_rejects_host_with_scheme() {
        let result = builder().host("http://mis.example.com").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = builder().build().unwrap();
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("hunter2"));
    }
}
