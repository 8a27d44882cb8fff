//! Estimates service.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use tracing::instrument;

use super::ServiceContext;
use crate::envelope::{extract, EnvelopeFailure, ResponseRule};
use crate::errors::TharsternResult;
use crate::types::RecordFilter;

/// Reads, creates and derives estimates.
#[derive(Debug, Clone)]
pub struct EstimatesService {
    context: ServiceContext,
}

impl EstimatesService {
    pub(crate) fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Lists estimates matching the filter by id and/or estimate reference.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RecordFilter) -> TharsternResult<Vec<Value>> {
        let request = self
            .context
            .get("estimates", filter.to_query("id", "estimateRef"))
            .await?;
        self.context
            .execute(request, &ResponseRule::new(extract::items))
            .await
    }

    /// Creates a new estimate from an existing one with a different quantity.
    ///
    /// The service's answer is not inspected beyond the transport status.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the service rejects the id or quantity.
    #[instrument(skip(self, id, quantity), fields(id = %id, quantity = %quantity))]
    pub async fn derive(&self, id: impl Display, quantity: impl Display) -> TharsternResult<()> {
        let request = self
            .context
            .get(
                "estimates/newestimatefromexisting",
                vec![
                    ("id".to_string(), id.to_string()),
                    ("quantity".to_string(), quantity.to_string()),
                ],
            )
            .await?;
        let rule = ResponseRule::new(extract::nothing).without_envelope_check();
        self.context.execute(request, &rule).await
    }

    /// Submits an estimate request and returns the `Details` of the answer.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` when the request fails validation; the message
    ///   lists the service's problems and quantity validation
    /// - `EstimateFailed` when the service could not produce the estimate
    #[instrument(skip(self, body))]
    pub async fn submit<B>(&self, body: &B) -> TharsternResult<Value>
    where
        B: Serialize + ?Sized,
    {
        let request = self.context.post("estrequest", body).await?;
        let rule = ResponseRule::new(extract::details).on_envelope_failure(EnvelopeFailure::Estimate);
        self.context.execute(request, &rule).await
    }
}
