//! Sales orders service.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::instrument;

use super::ServiceContext;
use crate::envelope::{extract, ResponseRule};
use crate::errors::{ErrorContext, TharsternError, TharsternResult};
use crate::transport::TransportResponse;
use crate::types::{OrderAsset, RecordFilter};

/// Order id the service reports for an order it refused to create.
pub const REFUSED_ORDER_ID: &str = "0";

const NO_ORDER_CREATED: &str = "no order created";

/// Reads and submits sales orders and their attachments.
#[derive(Debug, Clone)]
pub struct OrdersService {
    context: ServiceContext,
}

impl OrdersService {
    pub(crate) fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Lists sales orders matching the filter by id and/or order number.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &RecordFilter) -> TharsternResult<Vec<Value>> {
        let request = self
            .context
            .get("orders", filter.to_query("orderIDs", "orderNOs"))
            .await?;
        self.context
            .execute(request, &ResponseRule::new(extract::items))
            .await
    }

    /// Submits a sales order and returns the created orders.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` when the order fails validation
    /// - `SalesOrderFailed` when the first created order comes back with
    ///   id `"0"` (the message is that order's `StatusDetails`), or when
    ///   no order was created at all
    #[instrument(skip(self, body))]
    pub async fn submit<B>(&self, body: &B) -> TharsternResult<Vec<Value>>
    where
        B: Serialize + ?Sized,
    {
        let request = self.context.post("orders/submit", body).await?;
        let rule = ResponseRule::new(created_orders).rejecting(refused_order);
        self.context.execute(request, &rule).await
    }

    /// Uploads a file attached to a sales order.
    ///
    /// Returns the transport response as received; the envelope is not
    /// inspected.
    #[instrument(skip(self, asset), fields(order_id = asset.order_id, filename = %asset.filename))]
    pub async fn submit_asset(&self, asset: &OrderAsset) -> TharsternResult<TransportResponse> {
        let request = self.context.post("orders/submitorderasset", asset).await?;
        let rule = ResponseRule::new(extract::raw).without_envelope_check();
        self.context.execute(request, &rule).await
    }

    /// Reads `source`, encodes it and uploads it as `target_name`.
    ///
    /// # Errors
    ///
    /// `Attachment` when the file cannot be read, otherwise as
    /// [`submit_asset`](Self::submit_asset).
    #[instrument(skip(self, source, target_name), fields(source = %source.as_ref().display()))]
    pub async fn attach(
        &self,
        order_id: i64,
        source: impl AsRef<Path>,
        target_name: &str,
    ) -> TharsternResult<TransportResponse> {
        let path = source.as_ref();
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| TharsternError::Attachment {
                message: e.to_string(),
                path: path.to_path_buf(),
            })?;

        let asset = OrderAsset::from_bytes(order_id, target_name, &content);
        self.submit_asset(&asset).await
    }
}

fn created_orders(response: &TransportResponse) -> TharsternResult<Vec<Value>> {
    extract::list_at(response, "/Orders")
}

fn order_id_is_refused(id: Option<&Value>) -> bool {
    match id {
        Some(Value::String(id)) => id == REFUSED_ORDER_ID,
        Some(Value::Number(id)) => id.as_i64() == Some(0),
        Some(Value::Null) | None => true,
        Some(_) => false,
    }
}

fn refused_order(json: &Value, context: &ErrorContext) -> Option<TharsternError> {
    let Some(first) = json.pointer("/Details/Orders/0") else {
        return Some(TharsternError::SalesOrderFailed {
            message: NO_ORDER_CREATED.to_string(),
            context: Box::new(context.clone()),
        });
    };
    if !order_id_is_refused(first.get("ID")) {
        return None;
    }

    let message = match first.get("StatusDetails") {
        Some(Value::String(details)) => details.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    Some(TharsternError::SalesOrderFailed {
        message,
        context: Box::new(context.clone()),
    })
}
