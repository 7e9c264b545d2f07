use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{FieldError, JsonRpcErrorObject, JsonRpcException};
use crate::types::{JsonRpcVersion, RequestId};

/// A successful JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcSuccessResponse {
    #[serde(rename = "jsonrpc")]
    version: JsonRpcVersion,
    id: Option<RequestId>,
    result: Value,
}

impl JsonRpcSuccessResponse {
    pub fn new(id: Option<RequestId>, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            result,
        }
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn result(&self) -> &Value {
        &self.result
    }
}

/// A JSON-RPC error response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcErrorResponse {
    #[serde(rename = "jsonrpc")]
    version: JsonRpcVersion,
    id: Option<RequestId>,
    error: JsonRpcErrorObject,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            error,
        }
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn error(&self) -> &JsonRpcErrorObject {
        &self.error
    }
}

/// Either a success or an error response, never both and never neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcResponse {
    Success(JsonRpcSuccessResponse),
    Error(JsonRpcErrorResponse),
}

impl JsonRpcResponse {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self::Success(JsonRpcSuccessResponse::new(id, result))
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self::Error(JsonRpcErrorResponse::new(id, error))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcResponse::Error(_))
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcResponse::Success(resp) => resp.id(),
            JsonRpcResponse::Error(resp) => resp.id(),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            JsonRpcResponse::Success(resp) => Some(resp.result()),
            JsonRpcResponse::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        match self {
            JsonRpcResponse::Success(_) => None,
            JsonRpcResponse::Error(resp) => Some(resp.error()),
        }
    }

    /// Strictly validate a response received from a peer.
    pub fn from_value(value: &Value) -> Result<Self, JsonRpcException> {
        Self::check(value, "").map_err(|errors| JsonRpcException::from_field_errors(&errors))
    }

    fn check(value: &Value, prefix: &str) -> Result<Self, Vec<FieldError>> {
        let field = |name: &str| format!("{prefix}{name}");

        let Some(obj) = value.as_object() else {
            return Err(vec![FieldError::new(
                field("response"),
                "response must be an object",
            )]);
        };

        let mut errors = Vec::new();

        match obj.get("jsonrpc") {
            Some(version) => {
                if let Err(message) = JsonRpcVersion::from_value(version) {
                    errors.push(FieldError::new(field("jsonrpc"), message));
                }
            }
            None => errors.push(FieldError::new(field("jsonrpc"), "field required")),
        }

        let id = match obj.get("id").map_or(Ok(None), RequestId::from_value) {
            Ok(id) => id,
            Err(message) => {
                errors.push(FieldError::new(field("id"), message));
                None
            }
        };

        let response = match (obj.get("result"), obj.get("error")) {
            (Some(result), None) => Some(JsonRpcResponse::success(id, result.clone())),
            (None, Some(error)) => match JsonRpcErrorObject::from_value(error, &field("error")) {
                Ok(error) => Some(JsonRpcResponse::error(id, error)),
                Err(mut nested) => {
                    errors.append(&mut nested);
                    None
                }
            },
            _ => {
                errors.push(FieldError::new(
                    field("response"),
                    "response must contain exactly one of result and error",
                ));
                None
            }
        };

        match response {
            Some(response) if errors.is_empty() => Ok(response),
            _ => Err(errors),
        }
    }
}

impl<'de> Deserialize<'de> for JsonRpcResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl From<JsonRpcSuccessResponse> for JsonRpcResponse {
    fn from(response: JsonRpcSuccessResponse) -> Self {
        Self::Success(response)
    }
}

impl From<JsonRpcErrorResponse> for JsonRpcResponse {
    fn from(response: JsonRpcErrorResponse) -> Self {
        Self::Error(response)
    }
}

/// Ordered responses for a batch call. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonRpcBatchResponse(Vec<JsonRpcResponse>);

impl JsonRpcBatchResponse {
    pub fn new(responses: Vec<JsonRpcResponse>) -> Self {
        Self(responses)
    }

    pub fn push(&mut self, response: JsonRpcResponse) {
        self.0.push(response);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JsonRpcResponse> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<JsonRpcResponse> {
        self.0
    }

    /// Validate every element of a batch reply. An empty array is invalid.
    pub fn from_value(value: &Value) -> Result<Self, JsonRpcException> {
        let items = match value {
            Value::Array(items) if items.is_empty() => {
                return Err(JsonRpcException::from_field_errors(&[FieldError::new(
                    "batch",
                    "batch must not be empty",
                )]));
            }
            Value::Array(items) => items,
            _ => {
                return Err(JsonRpcException::from_field_errors(&[FieldError::new(
                    "batch",
                    "batch must be an array",
                )]));
            }
        };

        let mut responses = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match JsonRpcResponse::check(item, &format!("[{index}].")) {
                Ok(response) => responses.push(response),
                Err(mut nested) => errors.append(&mut nested),
            }
        }

        if errors.is_empty() {
            Ok(Self(responses))
        } else {
            Err(JsonRpcException::from_field_errors(&errors))
        }
    }
}

impl FromIterator<JsonRpcResponse> for JsonRpcBatchResponse {
    fn from_iter<I: IntoIterator<Item = JsonRpcResponse>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for JsonRpcBatchResponse {
    type Item = JsonRpcResponse;
    type IntoIter = std::vec::IntoIter<JsonRpcResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonRpcBatchResponse {
    type Item = &'a JsonRpcResponse;
    type IntoIter = std::slice::Iter<'a, JsonRpcResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What the transport writes back: one response, or a batch array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcReply {
    Single(JsonRpcResponse),
    Batch(JsonRpcBatchResponse),
}

impl JsonRpcReply {
    pub fn is_batch(&self) -> bool {
        matches!(self, JsonRpcReply::Batch(_))
    }

    /// Serialize for the wire
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<JsonRpcResponse> for JsonRpcReply {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Single(response)
    }
}

impl From<JsonRpcBatchResponse> for JsonRpcReply {
    fn from(batch: JsonRpcBatchResponse) -> Self {
        Self::Batch(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_exactly_one_payload(response: &JsonRpcResponse) {
        assert!(response.result().is_some() != response.error_object().is_some());
        assert_eq!(response.is_error(), response.error_object().is_some());
    }

    #[test]
    fn test_success_wire_shape() {
        let response = JsonRpcResponse::success(Some(RequestId::Number(1)), json!({"sum": 3}));
        assert_exactly_one_payload(&response);
        assert!(!response.is_error());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({"jsonrpc": "2.0", "id": 1, "result": {"sum": 3}}));
    }

    #[test]
    fn test_null_result_and_null_id_are_kept() {
        let response = JsonRpcResponse::success(None, Value::Null);
        assert_exactly_one_payload(&response);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({"jsonrpc": "2.0", "id": null, "result": null}));
    }

    #[test]
    fn test_error_wire_shape() {
        let error = JsonRpcException::method_not_found("nope").as_error();
        let response = JsonRpcResponse::error(Some(RequestId::from("a")), error);
        assert_exactly_one_payload(&response);
        assert!(response.is_error());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({
                "jsonrpc": "2.0",
                "id": "a",
                "error": {"code": -32601, "message": "Method not found", "data": "nope"}
            })
        );
    }

    #[test]
    fn test_from_value_rejects_both_or_neither() {
        let both = json!({"jsonrpc": "2.0", "id": 1, "result": 1, "error": {"code": 1, "message": "x"}});
        let neither = json!({"jsonrpc": "2.0", "id": 1});
        assert!(JsonRpcResponse::from_value(&both).is_err());
        assert!(JsonRpcResponse::from_value(&neither).is_err());
    }

    #[test]
    fn test_from_value_strict_id_and_error() {
        let float_id = json!({"jsonrpc": "2.0", "id": 2.5, "result": 1});
        assert!(JsonRpcResponse::from_value(&float_id).is_err());

        let bad_error = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": "x", "message": "m"}});
        assert!(JsonRpcResponse::from_value(&bad_error).is_err());

        let ok = JsonRpcResponse::from_value(
            &json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "Parse error"}}),
        )
        .unwrap();
        assert_exactly_one_payload(&ok);
        assert_eq!(ok.id(), None);
        assert_eq!(ok.error_object().map(|e| e.code()), Some(-32700));
    }

    #[test]
    fn test_deserialize_goes_through_validation() {
        let parsed: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"7","result":[1]}"#).unwrap();
        assert_eq!(parsed.id(), Some(&RequestId::String("7".to_string())));
        assert_exactly_one_payload(&parsed);

        assert!(serde_json::from_str::<JsonRpcResponse>(r#"{"jsonrpc":"1.0","id":1,"result":1}"#).is_err());
    }

    #[test]
    fn test_batch_serializes_as_array() {
        let batch: JsonRpcBatchResponse = vec![
            JsonRpcResponse::success(Some(RequestId::Number(1)), json!(3)),
            JsonRpcResponse::error(None, JsonRpcException::invalid_request(json!([])).as_error()),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        for response in &batch {
            assert_exactly_one_payload(response);
        }
    }

    #[test]
    fn test_batch_from_value() {
        assert!(JsonRpcBatchResponse::from_value(&json!([])).is_err());
        assert!(JsonRpcBatchResponse::from_value(&json!({})).is_err());

        let err = JsonRpcBatchResponse::from_value(
            &json!([{"jsonrpc": "2.0", "id": 1, "result": 1}, {"jsonrpc": "2.0", "id": true, "result": 1}]),
        )
        .unwrap_err();
        let errors: Vec<FieldError> = serde_json::from_value(err.data().clone()).unwrap();
        assert_eq!(errors[0].field, "[1].id");

        let batch = JsonRpcBatchResponse::from_value(
            &json!([{"jsonrpc": "2.0", "id": 1, "result": 1}, {"jsonrpc": "2.0", "id": 2, "result": 2}]),
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
    }
}
