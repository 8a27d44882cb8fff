//! HTTP transport implementation.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tracing::instrument;

use super::{is_client_error, BadRequest, ResponseInfo, TransportError, TransportResponse};
use crate::observability::{log_request, log_response};

/// Query keys whose values never leave the process in logs or diagnostics.
const SECRET_QUERY_KEYS: &[&str] = &["password"];

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// HTTP request representation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Full request URL.
    pub url: String,
    /// Request headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Query parameters; repeated keys encode lists.
    pub query: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a new GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a new POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends several headers, keeping their order.
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Appends several query parameters, keeping their order.
    pub fn with_query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Human-readable summary used in error context and logs.
    ///
    /// Secret query values are masked; the body is included verbatim.
    pub fn describe(&self) -> String {
        let mut summary = format!("{} {}", self.method.as_str(), self.url);

        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(name, value)| {
                    if SECRET_QUERY_KEYS.contains(&name.as_str()) {
                        format!("{}=***", name)
                    } else {
                        format!("{}={}", name, value)
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            summary.push('?');
            summary.push_str(&query);
        }

        if let Some(body) = &self.body {
            summary.push(' ');
            summary.push_str(&String::from_utf8_lossy(body));
        }

        summary
    }
}

/// HTTP transport trait.
///
/// Implementations return every non-4xx response as a [`TransportResponse`]
/// and report 4xx responses as [`TransportError::BadRequest`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, TransportError>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransportImpl {
    client: Client,
    timeout: Duration,
}

impl HttpTransportImpl {
    /// Creates a new HTTP transport.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HttpTransport for HttpTransportImpl {
    #[instrument(skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, TransportError> {
        log_request(&request.describe());

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name, value);
        }

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let started = Instant::now();
        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    timeout: self.timeout,
                }
            } else if e.is_connect() {
                TransportError::Connection {
                    message: e.to_string(),
                }
            } else {
                TransportError::InvalidResponse {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse {
                message: e.to_string(),
            })?;

        let info = ResponseInfo {
            method: request.method,
            url: request.url,
            status,
            elapsed: started.elapsed(),
        };
        log_response(status, info.elapsed, &body);

        let response = TransportResponse::new(body, info);
        if is_client_error(status) {
            return Err(TransportError::BadRequest(BadRequest::from_response(response)));
        }

        Ok(response)
    }
}

impl std::fmt::Debug for HttpTransportImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportImpl")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_masks_password() {
        let request = HttpRequest::get("http://mis/TharsternAPI/api/authentication/GenerateAPIToken")
            .with_query("email", "ops@example.com")
            .with_query("password", "hunter2")
            .with_query("applicationId", "app");

        let summary = request.describe();
        assert!(summary.contains("email=ops@example.com"));
        assert!(summary.contains("password=***"));
        assert!(!summary.contains("hunter2"));
    }

    #[test]
    fn test_describe_includes_body() {
        let request = HttpRequest::post("http://mis/TharsternAPI/api/job/update")
            .with_body(br#"{"JobId":7}"#.to_vec());
        assert_eq!(
            request.describe(),
            r#"POST http://mis/TharsternAPI/api/job/update {"JobId":7}"#
        );
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let request = HttpRequest::get("http://mis")
            .with_header("B", "2")
            .with_headers(vec![("A".to_string(), "1".to_string())]);
        assert_eq!(request.headers[0].0, "B");
        assert_eq!(request.headers[1].0, "A");
    }
}
