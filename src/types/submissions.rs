//! Request bodies the client builds itself.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// A file attached to a sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAsset {
    /// Sales order the file belongs to.
    #[serde(rename = "OrderId")]
    pub order_id: i64,
    /// Name the file is stored under.
    #[serde(rename = "Filename")]
    pub filename: String,
    /// File content, base64-encoded.
    #[serde(rename = "Content_Base64")]
    pub content_base64: String,
}

impl OrderAsset {
    /// Creates an asset from raw file bytes.
    pub fn from_bytes(order_id: i64, filename: impl Into<String>, content: &[u8]) -> Self {
        Self {
            order_id,
            filename: filename.into(),
            content_base64: STANDARD.encode(content),
        }
    }
}

/// Jobs queued for JDF submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinitionSubmission {
    /// Jobs to submit.
    #[serde(rename = "Items")]
    pub items: Vec<JobReference>,
}

/// A job in a [`JobDefinitionSubmission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReference {
    /// Job id.
    #[serde(rename = "JobId")]
    pub job_id: i64,
}

impl JobDefinitionSubmission {
    /// Submission for a single job.
    pub fn single(job_id: i64) -> Self {
        Self {
            items: vec![JobReference { job_id }],
        }
    }
}
