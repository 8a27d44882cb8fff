//! Type definitions for the Tharstern API.
//!
//! Response payloads are returned as `serde_json::Value` exactly as the
//! service sends them; only the shapes the client builds itself are typed.

pub mod filter;
pub mod submissions;

pub use filter::RecordFilter;
pub use submissions::{JobDefinitionSubmission, JobReference, OrderAsset};
