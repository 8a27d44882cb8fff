//! Jobs service.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::ServiceContext;
use crate::envelope::{details_at, extract, ResponseRule};
use crate::errors::TharsternResult;
use crate::transport::TransportResponse;
use crate::types::{JobDefinitionSubmission, RecordFilter};

/// Reads and updates jobs, and queues them for JDF submission.
#[derive(Debug, Clone)]
pub struct JobsService {
    context: ServiceContext,
}

impl JobsService {
    pub(crate) fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Lists jobs matching the filter by id and/or job number.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RecordFilter) -> TharsternResult<Vec<Value>> {
        let request = self
            .context
            .get("jobs", filter.to_query("id", "jobNo"))
            .await?;
        self.context
            .execute(request, &ResponseRule::new(extract::items))
            .await
    }

    /// Updates a job and returns the updated job.
    #[instrument(skip(self, body))]
    pub async fn update<B>(&self, body: &B) -> TharsternResult<Value>
    where
        B: Serialize + ?Sized,
    {
        let request = self.context.post("job/update", body).await?;
        self.context
            .execute(request, &ResponseRule::new(updated_job))
            .await
    }

    /// Queues a job for JDF submission and returns the envelope unchecked.
    ///
    /// `None` when the service answered with something other than JSON.
    #[instrument(skip(self))]
    pub async fn submit_definition(&self, job_id: i64) -> TharsternResult<Option<Value>> {
        let request = self
            .context
            .post("jdf/submitjobs", &JobDefinitionSubmission::single(job_id))
            .await?;
        let rule = ResponseRule::new(extract::envelope)
            .without_envelope_check()
            .propagate_bad_request();
        self.context.execute(request, &rule).await
    }
}

fn updated_job(response: &TransportResponse) -> TharsternResult<Value> {
    details_at(response, "/UpdatedJob")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::errors::ErrorKind;
    use crate::mocks::{authenticated_client, fixtures, MockResponse, MockTransport};
    use crate::transport::HttpMethod;
    use crate::types::RecordFilter;

    #[tokio::test]
    async fn test_list_by_job_number() {
        let transport = Arc::new(MockTransport::new());
        let client = authenticated_client(transport.clone()).await.unwrap();
        transport.queue(fixtures::items(vec![json!({"JobNo": "J-100", "Id": 100})]));

        let jobs = client
            .jobs()
            .list(&RecordFilter::by_reference("J-100"))
            .await
            .unwrap();

        assert_eq!(jobs, vec![json!({"JobNo": "J-100", "Id": 100})]);
        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "http://mis.test:80/TharsternAPI/api/jobs");
        assert_eq!(request.query, vec![("jobNo".to_string(), "J-100".to_string())]);
    }

    #[tokio::test]
    async fn test_list_bad_request_is_invalid_request() {
        let transport = Arc::new(MockTransport::new());
        let client = authenticated_client(transport.clone()).await.unwrap();
        transport.queue(MockResponse::bad_request(&json!({"Message": "bad id"})));

        let error = client.jobs().list(&RecordFilter::by_id("x")).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_update_returns_updated_job() {
        let transport = Arc::new(MockTransport::new());
        let client = authenticated_client(transport.clone()).await.unwrap();
        transport.queue(fixtures::success(json!({"UpdatedJob": {"Id": 100, "Status": "Printed"}})));

        let job = client
            .jobs()
            .update(&json!({"Id": 100, "Status": "Printed"}))
            .await
            .unwrap();

        assert_eq!(job, json!({"Id": 100, "Status": "Printed"}));
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://mis.test:80/TharsternAPI/api/job/update");
    }

    #[tokio::test]
    async fn test_update_envelope_failure_is_generic() {
        let transport = Arc::new(MockTransport::new());
        let client = authenticated_client(transport.clone()).await.unwrap();
        transport.queue(fixtures::failure(&[]));

        let error = client.jobs().update(&json!({})).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::GenericApiError);
    }

    #[tokio::test]
    async fn test_update_bad_request_is_invalid_request() {
        let transport = Arc::new(MockTransport::new());
        let client = authenticated_client(transport.clone()).await.unwrap();
        transport.queue(MockResponse::bad_request(&json!({
            "Details": {"Result": {"Problems": ["Unknown job status"]}}
        })));

        let error = client
            .jobs()
            .update(&json!({"Id": 100, "Status": "Lost"}))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidRequest);
        assert_eq!(error.message(), "Unknown job status");
    }

    #[tokio::test]
    async fn test_submit_definition_returns_envelope_unchecked() {
        let transport = Arc::new(MockTransport::new());
        let client = authenticated_client(transport.clone()).await.unwrap();
        let envelope = json!({"Status": {"Success": false}, "Details": {"Submitted": 0}});
        transport.queue_json(&envelope);

        let result = client.jobs().submit_definition(4711).await.unwrap();

        assert_eq!(result, Some(envelope));
        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "http://mis.test:80/TharsternAPI/api/jdf/submitjobs");
        let sent: Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"Items": [{"JobId": 4711}]}));
    }

    #[tokio::test]
    async fn test_submit_definition_propagates_transport_errors() {
        let transport = Arc::new(MockTransport::new());
        let client = authenticated_client(transport.clone()).await.unwrap();
        transport.queue(MockResponse::bad_request(&json!({})));

        let error = client.jobs().submit_definition(1).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Transport);
    }
}
