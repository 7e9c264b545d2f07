//! Entry points from decoded payloads to validated requests, and from handler
//! outcomes to responses.
//!
//! Everything here is a pure function of its input: no I/O, no shared state.
//! Malformed input always yields a classified error, never a panic.

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FieldError, JsonRpcException, MethodError};
use crate::request::JsonRpcRequest;
use crate::response::{JsonRpcErrorResponse, JsonRpcResponse};
use crate::types::RequestId;

/// A validated inbound payload
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcPayload {
    Single(JsonRpcRequest),
    Batch(Vec<BatchEntry>),
}

/// One element of a batch, validated independently of its siblings
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    /// Ready for dispatch
    Request(JsonRpcRequest),
    /// Failed validation; the error response is already correlated
    Invalid(JsonRpcErrorResponse),
}

impl BatchEntry {
    pub fn is_valid(&self) -> bool {
        matches!(self, BatchEntry::Request(_))
    }
}

/// Validate a single decoded message into a request.
pub fn validate_request(value: &Value) -> Result<JsonRpcRequest, JsonRpcException> {
    match JsonRpcRequest::from_value(value) {
        Ok(request) => {
            debug!(
                "Validated JSON-RPC request: method={}, notification={}",
                request.method(),
                request.is_notification()
            );
            Ok(request)
        }
        Err(exception) => {
            warn!("Rejected JSON-RPC request: {}", exception.data());
            Err(exception)
        }
    }
}

/// Validate a decoded payload, which is either one message or a batch.
///
/// A single invalid message, or an empty batch, is returned as an error
/// response. Inside a non-empty batch each element is validated on its own and
/// failures become [`BatchEntry::Invalid`].
pub fn validate_payload(value: &Value) -> Result<JsonRpcPayload, JsonRpcErrorResponse> {
    match value {
        Value::Array(items) if items.is_empty() => {
            warn!("Rejected empty JSON-RPC batch");
            Err(JsonRpcException::from_field_errors(&[FieldError::new(
                "batch",
                "batch must not be empty",
            )])
            .into_response(None))
        }
        Value::Array(items) => {
            debug!("Validating JSON-RPC batch of {} messages", items.len());
            let entries = items
                .iter()
                .map(|item| match validate_request(item) {
                    Ok(request) => BatchEntry::Request(request),
                    Err(exception) => BatchEntry::Invalid(exception.into_response(extract_id(item))),
                })
                .collect();
            Ok(JsonRpcPayload::Batch(entries))
        }
        _ => validate_request(value)
            .map(JsonRpcPayload::Single)
            .map_err(|exception| exception.into_response(extract_id(value))),
    }
}

/// Validate the outcome of the transport's decode step.
///
/// A decode failure is reported as ParseError with a `null` id, never as
/// InvalidRequest.
pub fn validate_decoded<E>(decoded: Result<Value, E>) -> Result<JsonRpcPayload, JsonRpcErrorResponse>
where
    E: fmt::Display,
{
    match decoded {
        Ok(value) => validate_payload(&value),
        Err(err) => {
            warn!("Failed to decode JSON-RPC payload: {}", err);
            Err(JsonRpcException::parse_error(err.to_string()).into_response(None))
        }
    }
}

/// Decode JSON text with `serde_json` and validate it.
pub fn parse_payload(text: &str) -> Result<JsonRpcPayload, JsonRpcErrorResponse> {
    validate_decoded(serde_json::from_str::<Value>(text))
}

/// Best-effort id of a message that failed validation, for correlation.
///
/// Returns `None` when the message is not an object or its id is itself
/// invalid.
pub fn extract_id(value: &Value) -> Option<RequestId> {
    value
        .get("id")
        .and_then(|id| RequestId::from_value(id).ok().flatten())
}

/// Map a handler outcome to a response for the request with `id`.
///
/// Failures already in the taxonomy are converted directly; anything else is
/// wrapped as MethodExecutionError.
pub fn response_for(id: Option<RequestId>, outcome: Result<Value, MethodError>) -> JsonRpcResponse {
    match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(failure) => {
            let exception = failure.into_exception();
            debug!(
                "Method failed: code={}, message={}",
                exception.code(),
                exception.message()
            );
            JsonRpcResponse::Error(exception.into_response(id))
        }
    }
}
