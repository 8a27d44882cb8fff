//! Tharstern API Client Library
//!
//! An async Rust client for the Tharstern print management API. It
//! authenticates against the service, issues requests for products,
//! estimates, sales orders, jobs, JDF submissions and order attachments,
//! and turns the service's JSON envelopes into typed results or typed errors.
//!
//! # Features
//!
//! - **Session handling**: token exchange on construction, refresh on demand
//! - **Typed failures**: malformed input, business refusals and missing
//!   resources surface as distinct [`ErrorKind`]s
//! - **Pass-through payloads**: response items are returned exactly as sent
//! - **Observability**: `tracing` spans and redacted request/response logs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tharstern_client::{ErrorKind, TharsternClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TharsternClient::connect(
//!         "mis.example.com",
//!         "ops@example.com",
//!         "secret",
//!         "web-shop",
//!         None,
//!     )
//!     .await?;
//!
//!     match client.products().get("BC-85x55").await {
//!         Ok(product) => println!("{}", product["Name"]),
//!         Err(e) if e.kind() == ErrorKind::ProductNotFound => println!("no such product"),
//!         Err(e) => return Err(e.into()),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod observability;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{TharsternClient, TharsternClientBuilder};
pub use config::TharsternConfig;
pub use errors::{ErrorContext, ErrorKind, TharsternError, TharsternResult};
pub use types::{JobDefinitionSubmission, OrderAsset, RecordFilter};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
