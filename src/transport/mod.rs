//! HTTP transport layer for the Tharstern client.
//!
//! Provides the transport abstraction the services dispatch through, and a
//! `reqwest` implementation. Client-error statuses (4xx) surface as a
//! distinguishable [`TransportError::BadRequest`] signal.

mod http;

pub use http::{HttpMethod, HttpRequest, HttpTransport, HttpTransportImpl};

use std::time::Duration;

/// Transport diagnostics for a completed exchange.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    /// HTTP method.
    pub method: HttpMethod,
    /// Full request URL, without the query string.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Time from dispatch to the last body byte.
    pub elapsed: Duration,
}

/// A response the transport did not classify as a bad request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Parsed body, when it is valid JSON.
    pub json: Option<serde_json::Value>,
    /// Transport diagnostics.
    pub info: ResponseInfo,
}

impl TransportResponse {
    /// Creates a response, parsing the body as JSON when possible.
    pub fn new(body: String, info: ResponseInfo) -> Self {
        let json = serde_json::from_str(&body).ok();
        Self {
            status: info.status,
            body,
            json,
            info,
        }
    }

    /// Returns true if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The service answered with a client-error status.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct BadRequest {
    /// Transport message.
    pub message: String,
    /// HTTP status code (400-499).
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Parsed body, when it is valid JSON.
    pub json: Option<serde_json::Value>,
    /// Transport diagnostics.
    pub info: ResponseInfo,
}

impl BadRequest {
    /// Builds the signal from a 4xx response.
    pub fn from_response(response: TransportResponse) -> Self {
        Self {
            message: format!("Bad request (HTTP {})", response.status),
            status: response.status,
            body: response.body,
            json: response.json,
            info: response.info,
        }
    }
}

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The service rejected the request with a 4xx status.
    #[error("{0}")]
    BadRequest(BadRequest),

    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}

/// Returns true for statuses the transport reports as bad requests.
pub fn is_client_error(status: u16) -> bool {
    (400..500).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(status: u16) -> ResponseInfo {
        ResponseInfo {
            method: HttpMethod::Get,
            url: "http://mis/TharsternAPI/api/products".to_string(),
            status,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_response_parses_json_body() {
        let response = TransportResponse::new(r#"{"Status":{"Success":true}}"#.to_string(), info(200));
        assert!(response.is_success());
        assert_eq!(response.json.unwrap()["Status"]["Success"], true);
    }

    #[test]
    fn test_response_keeps_non_json_body() {
        let response = TransportResponse::new("<html>oops</html>".to_string(), info(500));
        assert!(!response.is_success());
        assert!(response.json.is_none());
        assert_eq!(response.body, "<html>oops</html>");
    }

    #[test]
    fn test_bad_request_from_response() {
        let response = TransportResponse::new(r#"{"Message":"nope"}"#.to_string(), info(422));
        let rejection = BadRequest::from_response(response);
        assert_eq!(rejection.status, 422);
        assert_eq!(rejection.to_string(), "Bad request (HTTP 422)");
        assert!(rejection.json.is_some());
    }

    #[test]
    fn test_client_error_range() {
        assert!(is_client_error(400));
        assert!(is_client_error(499));
        assert!(!is_client_error(200));
        assert!(!is_client_error(500));
    }
}
