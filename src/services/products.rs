//! Products service.

use serde_json::Value;
use std::fmt::Display;
use tracing::instrument;

use super::ServiceContext;
use crate::envelope::{details_at, ResponseRule};
use crate::errors::{ErrorContext, TharsternError, TharsternResult};
use crate::transport::TransportResponse;

/// Looks up products and product types.
#[derive(Debug, Clone)]
pub struct ProductsService {
    context: ServiceContext,
}

impl ProductsService {
    pub(crate) fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Gets the product with the given code.
    ///
    /// # Errors
    ///
    /// `ProductNotFound` when the service reports no matching product.
    #[instrument(skip(self))]
    pub async fn get(&self, code: &str) -> TharsternResult<Value> {
        let request = self
            .context
            .get("products", vec![("productCode".to_string(), code.to_string())])
            .await?;
        let rule = ResponseRule::new(first_item).rejecting(product_missing);
        self.context.execute(request, &rule).await
    }

    /// Gets the product type with the given id.
    ///
    /// # Errors
    ///
    /// `ProductTypeNotFound` when the service reports no matching type.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn product_type(&self, id: impl Display) -> TharsternResult<Value> {
        let request = self
            .context
            .get("producttypes", vec![("id".to_string(), id.to_string())])
            .await?;
        let rule = ResponseRule::new(first_item).rejecting(product_type_missing);
        self.context.execute(request, &rule).await
    }
}

fn item_count(json: &Value) -> i64 {
    json.pointer("/Details/TotalItemCount")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

fn has_first_item(json: &Value) -> bool {
    json.pointer("/Details/Items/0").is_some()
}

fn product_missing(json: &Value, context: &ErrorContext) -> Option<TharsternError> {
    (item_count(json) < 1 || !has_first_item(json)).then(|| TharsternError::ProductNotFound {
        message: "product not found".to_string(),
        context: Box::new(context.clone()),
    })
}

fn product_type_missing(json: &Value, context: &ErrorContext) -> Option<TharsternError> {
    (item_count(json) < 1 || !has_first_item(json)).then(|| TharsternError::ProductTypeNotFound {
        message: "product type not found".to_string(),
        context: Box::new(context.clone()),
    })
}

fn first_item(response: &TransportResponse) -> TharsternResult<Value> {
    details_at(response, "/Items/0")
}
