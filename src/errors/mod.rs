//! Error types for the Tharstern client.
//!
//! Business failures reported by the service are a closed set of variants,
//! each carrying a human-readable message and a diagnostic [`ErrorContext`].
//! Callers branch on [`TharsternError::kind`], never on message text.

use std::path::PathBuf;
use thiserror::Error;

use crate::transport::{BadRequest, HttpRequest, ResponseInfo, TransportError, TransportResponse};

/// Result type alias for Tharstern operations.
pub type TharsternResult<T> = Result<T, TharsternError>;

/// Error type for Tharstern client operations.
#[derive(Debug, Error)]
pub enum TharsternError {
    /// The envelope reported failure with no more specific classification.
    #[error("API error: {message}")]
    Api {
        /// Error message.
        message: String,
        /// Diagnostic context.
        context: Box<ErrorContext>,
    },

    /// The credential exchange returned the nil token.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
        /// Diagnostic context.
        context: Box<ErrorContext>,
    },

    /// The service rejected the request as malformed (HTTP 4xx).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Validation text extracted from the rejection.
        message: String,
        /// The transport-level rejection.
        #[source]
        source: Box<BadRequest>,
        /// Diagnostic context.
        context: Box<ErrorContext>,
    },

    /// No product matched the requested code.
    #[error("Product not found: {message}")]
    ProductNotFound {
        /// Error message.
        message: String,
        /// Diagnostic context.
        context: Box<ErrorContext>,
    },

    /// No product type matched the requested id.
    #[error("Product type not found: {message}")]
    ProductTypeNotFound {
        /// Error message.
        message: String,
        /// Diagnostic context.
        context: Box<ErrorContext>,
    },

    /// The estimate request was refused.
    #[error("Estimate failed: {message}")]
    EstimateFailed {
        /// Error message.
        message: String,
        /// Diagnostic context.
        context: Box<ErrorContext>,
    },

    /// The sales order was refused despite a successful envelope.
    #[error("Sales order failed: {message}")]
    SalesOrderFailed {
        /// Status details reported for the refused order.
        message: String,
        /// Diagnostic context.
        context: Box<ErrorContext>,
    },

    /// An operation needed the session token before one was issued.
    #[error("Session is not authenticated")]
    NotAuthenticated,

    /// Configuration error (missing credentials, bad host, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Transport failure that is not translated into a business error.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Request body could not be encoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// Attachment source could not be read.
    #[error("Attachment error ({}): {message}", path.display())]
    Attachment {
        /// Error message.
        message: String,
        /// Path of the source file.
        path: PathBuf,
    },
}

/// Discriminant of a [`TharsternError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`TharsternError::Api`].
    GenericApiError,
    /// See [`TharsternError::AuthenticationFailed`].
    AuthenticationFailed,
    /// See [`TharsternError::InvalidRequest`].
    InvalidRequest,
    /// See [`TharsternError::ProductNotFound`].
    ProductNotFound,
    /// See [`TharsternError::ProductTypeNotFound`].
    ProductTypeNotFound,
    /// See [`TharsternError::EstimateFailed`].
    EstimateFailed,
    /// See [`TharsternError::SalesOrderFailed`].
    SalesOrderFailed,
    /// See [`TharsternError::NotAuthenticated`].
    NotAuthenticated,
    /// See [`TharsternError::Configuration`].
    Configuration,
    /// See [`TharsternError::Transport`].
    Transport,
    /// See [`TharsternError::Serialization`].
    Serialization,
    /// See [`TharsternError::Attachment`].
    Attachment,
}

/// Diagnostic data attached to business errors.
///
/// Intended for logs and debugging only.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Description of the request that was sent.
    pub request: Option<String>,
    /// Raw response body.
    pub response: Option<String>,
    /// Parsed response body, when it was JSON.
    pub json: Option<serde_json::Value>,
    /// Transport diagnostics.
    pub info: Option<ResponseInfo>,
}

impl ErrorContext {
    /// Builds the context for a completed request/response exchange.
    pub fn exchange(request: &HttpRequest, response: &TransportResponse) -> Self {
        Self {
            request: Some(request.describe()),
            response: Some(response.body.clone()),
            json: response.json.clone(),
            info: Some(response.info.clone()),
        }
    }

    /// Builds the context for a request rejected with a bad-request status.
    pub fn rejected(request: &HttpRequest, rejection: &BadRequest) -> Self {
        Self {
            request: Some(request.describe()),
            response: Some(rejection.body.clone()),
            json: rejection.json.clone(),
            info: Some(rejection.info.clone()),
        }
    }
}

impl TharsternError {
    /// Returns the error discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TharsternError::Api { .. } => ErrorKind::GenericApiError,
            TharsternError::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            TharsternError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            TharsternError::ProductNotFound { .. } => ErrorKind::ProductNotFound,
            TharsternError::ProductTypeNotFound { .. } => ErrorKind::ProductTypeNotFound,
            TharsternError::EstimateFailed { .. } => ErrorKind::EstimateFailed,
            TharsternError::SalesOrderFailed { .. } => ErrorKind::SalesOrderFailed,
            TharsternError::NotAuthenticated => ErrorKind::NotAuthenticated,
            TharsternError::Configuration { .. } => ErrorKind::Configuration,
            TharsternError::Transport(_) => ErrorKind::Transport,
            TharsternError::Serialization { .. } => ErrorKind::Serialization,
            TharsternError::Attachment { .. } => ErrorKind::Attachment,
        }
    }

    /// Returns the message without the kind prefix used by `Display`.
    pub fn message(&self) -> String {
        match self {
            TharsternError::Api { message, .. }
            | TharsternError::AuthenticationFailed { message, .. }
            | TharsternError::InvalidRequest { message, .. }
            | TharsternError::ProductNotFound { message, .. }
            | TharsternError::ProductTypeNotFound { message, .. }
            | TharsternError::EstimateFailed { message, .. }
            | TharsternError::SalesOrderFailed { message, .. }
            | TharsternError::Configuration { message }
            | TharsternError::Serialization { message }
            | TharsternError::Attachment { message, .. } => message.clone(),
            TharsternError::NotAuthenticated | TharsternError::Transport(_) => self.to_string(),
        }
    }

    /// Returns the diagnostic context, if the error carries one.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            TharsternError::Api { context, .. }
            | TharsternError::AuthenticationFailed { context, .. }
            | TharsternError::InvalidRequest { context, .. }
            | TharsternError::ProductNotFound { context, .. }
            | TharsternError::ProductTypeNotFound { context, .. }
            | TharsternError::EstimateFailed { context, .. }
            | TharsternError::SalesOrderFailed { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Creates a generic API error.
    pub fn api(message: impl Into<String>, context: ErrorContext) -> Self {
        TharsternError::Api {
            message: message.into(),
            context: Box::new(context),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        TharsternError::Configuration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for TharsternError {
    fn from(err: serde_json::Error) -> Self {
        TharsternError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for TharsternError {
    fn from(err: url::ParseError) -> Self {
        TharsternError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
