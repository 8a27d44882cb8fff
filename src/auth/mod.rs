//! Authentication module for the Tharstern client.
//!
//! The service exchanges an email, password and application id for a token.
//! Later requests carry `Authorization: Basic <base64(token)>`, which is the
//! service's own convention rather than HTTP Basic credentials.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::config::TharsternConfig;
use crate::envelope::{details_at, ResponseRule};
use crate::errors::{ErrorContext, TharsternError, TharsternResult};
use crate::transport::{HttpRequest, HttpTransport, TransportResponse};

/// Token-issuing endpoint, relative to the API base URL.
pub const TOKEN_ENDPOINT: &str = "authentication/GenerateAPIToken";

/// Builds the standard header set for a token, in send order.
pub fn standard_headers_for(token: &str) -> Vec<(String, String)> {
    vec![
        (
            "Authorization".to_string(),
            format!("Basic {}", STANDARD.encode(token)),
        ),
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ]
}

/// Returns true for the all-zero token the service issues on bad credentials.
///
/// Only the exact hyphenated form counts.
pub fn is_nil_token(token: &str) -> bool {
    token == uuid::Uuid::nil().hyphenated().to_string()
}

struct AuthState {
    token: SecretString,
    headers: Vec<(String, String)>,
}

/// Authenticated session: base URL, credentials and the issued token.
///
/// The token and headers are written by [`Session::authenticate`] and read
/// by every resource call. A failed authentication leaves any previously
/// issued token in place.
pub struct Session {
    base_url: String,
    username: String,
    password: SecretString,
    application_id: String,
    state: RwLock<Option<AuthState>>,
}

impl Session {
    /// Creates an unauthenticated session.
    pub fn new(config: &TharsternConfig) -> Self {
        Self {
            base_url: config.base_url(),
            username: config.username.clone(),
            password: SecretString::new(config.password().to_string()),
            application_id: config.application_id.clone(),
            state: RwLock::new(None),
        }
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the full URL for an endpoint.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchanges the credentials for a token and stores it.
    ///
    /// Safe to call again to refresh the token.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` when the service issues the nil token
    /// - `Api` when the envelope reports failure or carries no token
    /// - `Transport` for transport failures, bad requests included
    #[instrument(skip(self, transport), fields(username = %self.username))]
    pub async fn authenticate(&self, transport: &dyn HttpTransport) -> TharsternResult<()> {
        let request = HttpRequest::get(self.endpoint_url(TOKEN_ENDPOINT))
            .with_query("email", self.username.as_str())
            .with_query("password", self.password.expose_secret().as_str())
            .with_query("applicationId", self.application_id.as_str());

        let rule = ResponseRule::new(issued_token)
            .propagate_bad_request()
            .rejecting(reject_nil_token);
        let outcome = transport.send(request.clone()).await;
        let token = rule.apply(&request, outcome)?;

        let headers = standard_headers_for(&token);
        *self.state.write().await = Some(AuthState {
            token: SecretString::new(token),
            headers,
        });
        tracing::debug!("Session token issued");

        Ok(())
    }

    /// Returns the standard headers for the current token.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` if no token has been issued yet.
    pub async fn standard_headers(&self) -> TharsternResult<Vec<(String, String)>> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|state| state.headers.clone())
            .ok_or(TharsternError::NotAuthenticated)
    }

    /// Returns true once a token has been issued.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    #[cfg(test)]
    pub(crate) async fn token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|state| state.token.expose_secret().clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .finish_non_exhaustive()
    }
}

fn issued_token(response: &TransportResponse) -> TharsternResult<String> {
    match details_at(response, "/Token")? {
        Value::String(token) if !token.is_empty() => Ok(token),
        _ => Err(TharsternError::api(
            "response carries no token",
            ErrorContext {
                response: Some(response.body.clone()),
                info: Some(response.info.clone()),
                ..ErrorContext::default()
            },
        )),
    }
}

fn reject_nil_token(json: &Value, context: &ErrorContext) -> Option<TharsternError> {
    let token = json.pointer("/Details/Token").and_then(Value::as_str)?;
    is_nil_token(token).then(|| TharsternError::AuthenticationFailed {
        message: "got invalid token (check user, password, and application ID)".to_string(),
        context: Box::new(ErrorContext {
            request: None,
            ..context.clone()
        }),
    })
}
