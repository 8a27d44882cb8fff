//! Response envelope interpretation.
//!
//! Every endpoint answers with `{"Status": {"Success": bool}, "Details": ...}`.
//! A single [`ResponseRule`] turns a transport outcome into a typed result,
//! checking three layers in order:
//!
//! 1. transport bad-request signal, translated into `InvalidRequest`;
//! 2. envelope `Status.Success`, translated into an endpoint-specific failure;
//! 3. sentinel values inside a successful envelope (business rejection).
//!
//! Only then is the relevant part of `Details` extracted.

use serde_json::Value;

use crate::errors::{ErrorContext, TharsternError, TharsternResult};
use crate::transport::{BadRequest, HttpRequest, TransportError, TransportResponse};

/// JSON pointer to the service's validation problem list.
pub const PROBLEMS_POINTER: &str = "/Details/Result/Problems";

/// Model-state key the service uses for quantity validation.
pub const QUANTITY_VALIDATION_KEY: &str = "estRequestProduct.Quantity";

/// Returns true when `Status.Success` is literally `true`.
pub fn succeeded(json: Option<&Value>) -> bool {
    json.and_then(|j| j.pointer("/Status/Success"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Returns the validation problem strings of an envelope.
pub fn problems(json: &Value) -> Vec<String> {
    json.pointer(PROBLEMS_POINTER)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|p| p.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the quantity validation message carried in `ModelState`.
///
/// The service emits either a string or a list of strings.
pub fn quantity_validation(json: &Value) -> Option<String> {
    let entry = json.get("ModelState")?.get(QUANTITY_VALIDATION_KEY)?;
    match entry {
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => {
            let lines: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        _ => None,
    }
}

/// Builds the message for a rejected request.
///
/// Problem strings first, then the quantity validation, one per line;
/// the transport message when the body carries neither.
pub fn rejection_message(rejection: &BadRequest) -> String {
    let mut lines = Vec::new();
    if let Some(json) = &rejection.json {
        lines.extend(problems(json));
        lines.extend(quantity_validation(json));
    }

    if lines.is_empty() {
        rejection.message.clone()
    } else {
        lines.join("\n")
    }
}

/// Translates a bad-request signal into `InvalidRequest`.
pub fn invalid_request(request: &HttpRequest, rejection: BadRequest) -> TharsternError {
    TharsternError::InvalidRequest {
        message: rejection_message(&rejection),
        context: Box::new(ErrorContext::rejected(request, &rejection)),
        source: Box::new(rejection),
    }
}

/// Reads a value below `Details`, failing with a generic API error.
pub fn details_at(response: &TransportResponse, pointer: &str) -> TharsternResult<Value> {
    let path = format!("/Details{}", pointer);
    response
        .json
        .as_ref()
        .and_then(|json| json.pointer(&path))
        .cloned()
        .ok_or_else(|| {
            TharsternError::api(format!("response is missing {}", path), response_context(response))
        })
}

/// Context for failures detected after the request is out of scope.
pub fn response_context(response: &TransportResponse) -> ErrorContext {
    ErrorContext {
        response: Some(response.body.clone()),
        json: response.json.clone(),
        info: Some(response.info.clone()),
        ..ErrorContext::default()
    }
}

/// Which typed error an envelope-level failure becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFailure {
    /// `TharsternError::Api`.
    Generic,
    /// `TharsternError::EstimateFailed`.
    Estimate,
}

impl EnvelopeFailure {
    fn into_error(self, message: String, context: ErrorContext) -> TharsternError {
        let context = Box::new(context);
        match self {
            EnvelopeFailure::Generic => TharsternError::Api { message, context },
            EnvelopeFailure::Estimate => TharsternError::EstimateFailed { message, context },
        }
    }
}

/// Business-rejection check run on a successful envelope.
pub type Rejection = fn(&Value, &ErrorContext) -> Option<TharsternError>;

/// Success extraction run once every check has passed.
pub type Extraction<T> = fn(&TransportResponse) -> TharsternResult<T>;

/// How one endpoint's response is judged and unpacked.
pub struct ResponseRule<T> {
    translate_bad_request: bool,
    envelope: Option<EnvelopeFailure>,
    rejection: Option<Rejection>,
    extract: Extraction<T>,
}

impl<T> ResponseRule<T> {
    /// Creates a rule with the default checks: bad requests become
    /// `InvalidRequest` and envelope failures become generic API errors.
    pub fn new(extract: Extraction<T>) -> Self {
        Self {
            translate_bad_request: true,
            envelope: Some(EnvelopeFailure::Generic),
            rejection: None,
            extract,
        }
    }

    /// Selects the error an envelope failure becomes.
    #[must_use]
    pub fn on_envelope_failure(mut self, failure: EnvelopeFailure) -> Self {
        self.envelope = Some(failure);
        self
    }

    /// Skips the `Status.Success` check.
    #[must_use]
    pub fn without_envelope_check(mut self) -> Self {
        self.envelope = None;
        self
    }

    /// Lets bad-request signals through as transport errors.
    #[must_use]
    pub fn propagate_bad_request(mut self) -> Self {
        self.translate_bad_request = false;
        self
    }

    /// Adds a business-rejection check.
    #[must_use]
    pub fn rejecting(mut self, rejection: Rejection) -> Self {
        self.rejection = Some(rejection);
        self
    }

    /// Applies the rule to a transport outcome.
    pub fn apply(
        &self,
        request: &HttpRequest,
        outcome: Result<TransportResponse, TransportError>,
    ) -> TharsternResult<T> {
        let response = match outcome {
            Ok(response) => response,
            Err(TransportError::BadRequest(rejection)) if self.translate_bad_request => {
                return Err(invalid_request(request, rejection));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(failure) = self.envelope {
            if !succeeded(response.json.as_ref()) {
                let message = response
                    .json
                    .as_ref()
                    .and_then(|json| problems(json).into_iter().next())
                    .unwrap_or_else(|| response.body.clone());
                tracing::debug!(status = response.status, "Envelope reported failure");
                return Err(failure.into_error(message, ErrorContext::exchange(request, &response)));
            }
        }

        if let (Some(reject), Some(json)) = (self.rejection, response.json.as_ref()) {
            if let Some(error) = reject(json, &ErrorContext::exchange(request, &response)) {
                return Err(error);
            }
        }

        (self.extract)(&response)
    }
}

impl<T> std::fmt::Debug for ResponseRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseRule")
            .field("translate_bad_request", &self.translate_bad_request)
            .field("envelope", &self.envelope)
            .field("rejection", &self.rejection.is_some())
            .finish()
    }
}

/// Stock success extractions.
pub mod extract {
    use super::{details_at, response_context, TharsternError, TharsternResult, TransportResponse, Value};

    /// `Details.Items`, unmodified.
    pub fn items(response: &TransportResponse) -> TharsternResult<Vec<Value>> {
        list_at(response, "/Items")
    }

    /// A list below `Details`, unmodified.
    pub fn list_at(response: &TransportResponse, pointer: &str) -> TharsternResult<Vec<Value>> {
        match details_at(response, pointer)? {
            Value::Array(items) => Ok(items),
            _ => Err(TharsternError::api(
                format!("/Details{} is not a list", pointer),
                response_context(response),
            )),
        }
    }

    /// `Details` as a whole.
    pub fn details(response: &TransportResponse) -> TharsternResult<Value> {
        details_at(response, "")
    }

    /// The parsed envelope, unchecked.
    pub fn envelope(response: &TransportResponse) -> TharsternResult<Option<Value>> {
        Ok(response.json.clone())
    }

    /// The transport response itself.
    pub fn raw(response: &TransportResponse) -> TharsternResult<TransportResponse> {
        Ok(response.clone())
    }

    /// Nothing; the call is fire-and-forget.
    pub fn nothing(_response: &TransportResponse) -> TharsternResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    use crate::errors::ErrorKind;
    use crate::transport::{HttpMethod, ResponseInfo};

    fn request() -> HttpRequest {
        HttpRequest::post("http://mis:80/TharsternAPI/api/estrequest").with_body(b"{}".to_vec())
    }

    fn response(status: u16, body: &Value) -> TransportResponse {
        TransportResponse::new(
            body.to_string(),
            ResponseInfo {
                method: HttpMethod::Post,
                url: "http://mis:80/TharsternAPI/api/estrequest".to_string(),
                status,
                elapsed: Duration::from_millis(1),
            },
        )
    }

    fn bad_request(body: &Value) -> TransportError {
        TransportError::BadRequest(BadRequest::from_response(response(400, body)))
    }

    #[test]
    fn test_succeeded_requires_literal_true() {
        assert!(succeeded(Some(&json!({"Status": {"Success": true}}))));
        assert!(!succeeded(Some(&json!({"Status": {"Success": false}}))));
        assert!(!succeeded(Some(&json!({"Status": {"Success": "true"}}))));
        assert!(!succeeded(Some(&json!({"Details": {}}))));
        assert!(!succeeded(None));
    }

    #[test]
    fn test_rejection_message_joins_problems_then_quantity() {
        let body = json!({
            "Details": {"Result": {"Problems": ["Stock missing", "Size invalid"]}},
            "ModelState": {"estRequestProduct.Quantity": ["Quantity must be at least 1"]}
        });
        let rejection = BadRequest::from_response(response(400, &body));

        assert_eq!(
            rejection_message(&rejection),
            "Stock missing\nSize invalid\nQuantity must be at least 1"
        );
    }

    #[test]
    fn test_rejection_message_quantity_only() {
        let body = json!({"ModelState": {"estRequestProduct.Quantity": "Quantity is required"}});
        let rejection = BadRequest::from_response(response(400, &body));
        assert_eq!(rejection_message(&rejection), "Quantity is required");
    }

    #[test]
    fn test_rejection_message_falls_back_to_transport() {
        let rejection = BadRequest::from_response(response(400, &json!({"Message": "nope"})));
        assert_eq!(rejection_message(&rejection), "Bad request (HTTP 400)");
    }

    #[test]
    fn test_bad_request_becomes_invalid_request() {
        let rule = ResponseRule::new(extract::details);
        let body = json!({"Details": {"Result": {"Problems": ["Missing customer"]}}});

        let error = rule.apply(&request(), Err(bad_request(&body))).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidRequest);
        assert_eq!(error.message(), "Missing customer");
        let context = error.context().unwrap();
        assert_eq!(context.json.as_ref(), Some(&body));
        assert!(context.request.as_deref().unwrap().starts_with("POST "));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_bad_request_propagates_when_configured() {
        let rule = ResponseRule::new(extract::envelope).propagate_bad_request();
        let error = rule.apply(&request(), Err(bad_request(&json!({})))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_envelope_failure_uses_first_problem() {
        let rule = ResponseRule::new(extract::details).on_envelope_failure(EnvelopeFailure::Estimate);
        let body = json!({
            "Status": {"Success": false},
            "Details": {"Result": {"Problems": ["No price found", "Other"]}}
        });

        let error = rule.apply(&request(), Ok(response(200, &body))).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::EstimateFailed);
        assert_eq!(error.message(), "No price found");
    }

    #[test]
    fn test_envelope_failure_falls_back_to_raw_body() {
        let rule = ResponseRule::new(extract::details);
        let body = json!({"Status": {"Success": false}, "Details": null});

        let error = rule.apply(&request(), Ok(response(200, &body))).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::GenericApiError);
        assert_eq!(error.message(), body.to_string());
    }

    #[test]
    fn test_rejection_runs_after_envelope_check() {
        fn always(_: &Value, context: &ErrorContext) -> Option<TharsternError> {
            Some(TharsternError::SalesOrderFailed {
                message: "rejected".to_string(),
                context: Box::new(context.clone()),
            })
        }
        let rule = ResponseRule::new(extract::details).rejecting(always);

        let failed = json!({"Status": {"Success": false}});
        let error = rule.apply(&request(), Ok(response(200, &failed))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::GenericApiError);

        let ok = json!({"Status": {"Success": true}, "Details": {}});
        let error = rule.apply(&request(), Ok(response(200, &ok))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SalesOrderFailed);
    }

    #[test]
    fn test_unchecked_rule_returns_envelope_as_is() {
        let rule = ResponseRule::new(extract::envelope).without_envelope_check();
        let body = json!({"Status": {"Success": false}, "Details": {"Items": []}});
        let value = rule.apply(&request(), Ok(response(200, &body))).unwrap();
        assert_eq!(value, Some(body));
    }

    #[test]
    fn test_items_preserve_order_and_fields() {
        let raw = r#"{"Status":{"Success":true},"Details":{"TotalItemCount":2,"Items":[{"Zeta":1,"Alpha":2},{"Mid":3}]}}"#;
        let response = TransportResponse::new(
            raw.to_string(),
            ResponseInfo {
                method: HttpMethod::Get,
                url: "http://mis".to_string(),
                status: 200,
                elapsed: Duration::ZERO,
            },
        );

        let items = extract::items(&response).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].to_string(), r#"{"Zeta":1,"Alpha":2}"#);
        assert_eq!(items[1].to_string(), r#"{"Mid":3}"#);
    }

    #[test]
    fn test_missing_details_is_api_error() {
        let body = json!({"Status": {"Success": true}});
        let error = extract::items(&response(200, &body)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::GenericApiError);
        assert!(error.message().contains("/Details/Items"));
    }
}
