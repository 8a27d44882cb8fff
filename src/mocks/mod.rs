//! Mock implementations for testing.
//!
//! Provides a mock transport and envelope fixtures for exercising the
//! client without a running service.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::client::TharsternClient;
use crate::errors::TharsternResult;
use crate::transport::{
    is_client_error, BadRequest, HttpRequest, HttpTransport, ResponseInfo, TransportError,
    TransportResponse,
};

/// Mock HTTP transport for testing.
///
/// Responses are served in queue order. Like the real transport, 4xx
/// responses are reported as [`TransportError::BadRequest`].
pub struct MockTransport {
    responses: Mutex<Vec<MockResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self {
            status: 200,
            body: serde_json::to_string(value).unwrap_or_default(),
        }
    }

    /// Creates a 400 response with a JSON body.
    pub fn bad_request<T: serde::Serialize>(value: &T) -> Self {
        Self::json(value).with_status(400)
    }

    /// Creates a response with a raw body.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a response with custom status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push(response);
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_response(&self) -> MockResponse {
        let mut responses = lock(&self.responses);
        if responses.is_empty() {
            MockResponse::text(500, "No mock response configured")
        } else {
            responses.remove(0)
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, TransportError> {
        lock(&self.requests).push(request.clone());

        let mock = self.next_response();
        let response = TransportResponse::new(
            mock.body,
            ResponseInfo {
                method: request.method,
                url: request.url,
                status: mock.status,
                elapsed: Duration::ZERO,
            },
        );

        if is_client_error(mock.status) {
            return Err(TransportError::BadRequest(BadRequest::from_response(response)));
        }
        Ok(response)
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}

/// Test fixtures for common envelopes.
pub mod fixtures {
    use super::MockResponse;
    use serde_json::{json, Value};

    /// Token issued to mock clients.
    pub const TOKEN: &str = "6f1c2d3e-1111-2222-3333-444455556666";

    /// A successful envelope around `details`.
    pub fn success(details: Value) -> MockResponse {
        MockResponse::json(&json!({
            "Status": {"Success": true},
            "Details": details
        }))
    }

    /// A failed envelope carrying validation problems.
    pub fn failure(problems: &[&str]) -> MockResponse {
        MockResponse::json(&json!({
            "Status": {"Success": false},
            "Details": {"Result": {"Problems": problems}}
        }))
    }

    /// A token-exchange response.
    pub fn token_response(token: &str) -> MockResponse {
        success(json!({ "Token": token }))
    }

    /// A paged item list.
    pub fn items(items: Vec<Value>) -> MockResponse {
        success(json!({
            "TotalItemCount": items.len(),
            "Items": items
        }))
    }
}

/// Builds a client over `transport`, consuming one queued token response.
///
/// # Errors
///
/// Propagates configuration and authentication failures.
pub async fn authenticated_client(transport: Arc<MockTransport>) -> TharsternResult<TharsternClient> {
    transport.queue(fixtures::token_response(fixtures::TOKEN));
    TharsternClient::builder()
        .host("mis.test")
        .username("ops@example.com")
        .password("hunter2")
        .application_id("web-shop")
        .transport(transport)
        .build()
        .await
}
