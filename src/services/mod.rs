//! Service implementations for the Tharstern API.
//!
//! Each resource group gets its own service object. All of them share one
//! transport and one session, and judge responses through
//! [`ResponseRule`](crate::envelope::ResponseRule).

mod estimates;
mod jobs;
mod orders;
mod products;

pub use estimates::EstimatesService;
pub use jobs::JobsService;
pub use orders::OrdersService;
pub use products::ProductsService;

use serde::Serialize;
use std::sync::Arc;

use crate::auth::Session;
use crate::envelope::ResponseRule;
use crate::errors::TharsternResult;
use crate::transport::{HttpRequest, HttpTransport};

/// Transport and session shared by the services.
#[derive(Clone)]
pub(crate) struct ServiceContext {
    transport: Arc<dyn HttpTransport>,
    session: Arc<Session>,
}

impl ServiceContext {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    /// Builds an authenticated GET request.
    pub(crate) async fn get(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> TharsternResult<HttpRequest> {
        Ok(HttpRequest::get(self.session.endpoint_url(path))
            .with_headers(self.session.standard_headers().await?)
            .with_query_pairs(query))
    }

    /// Builds an authenticated POST request with a JSON body.
    pub(crate) async fn post<B>(&self, path: &str, body: &B) -> TharsternResult<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        Ok(HttpRequest::post(self.session.endpoint_url(path))
            .with_headers(self.session.standard_headers().await?)
            .with_body(body))
    }

    /// Sends a request and applies the rule to the outcome.
    pub(crate) async fn execute<T>(
        &self,
        request: HttpRequest,
        rule: &ResponseRule<T>,
    ) -> TharsternResult<T> {
        let outcome = self.transport.send(request.clone()).await;
        rule.apply(&request, outcome)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("base_url", &self.session.base_url())
            .finish_non_exhaustive()
    }
}
