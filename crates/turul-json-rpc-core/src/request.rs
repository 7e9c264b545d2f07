use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldError, JsonRpcException};
use crate::types::{JsonRpcVersion, RequestId};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(Map<String, Value>),
}

impl Default for RequestParams {
    fn default() -> Self {
        RequestParams::Object(Map::new())
    }
}

impl RequestParams {
    /// Only an array or an object is accepted; `null`, strings and numbers are not.
    pub fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Array(items) => Ok(RequestParams::Array(items.clone())),
            Value::Object(map) => Ok(RequestParams::Object(map.clone())),
            _ => Err("params must be an array or an object"),
        }
    }

    /// Get a parameter by name (for object params)
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            RequestParams::Object(map) => map.get(key),
            RequestParams::Array(_) => None,
        }
    }

    /// Get a parameter by index (for array params only)
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            RequestParams::Array(vec) => vec.get(index),
            RequestParams::Object(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RequestParams::Object(map) => map.is_empty(),
            RequestParams::Array(vec) => vec.is_empty(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Object(map) => Value::Object(map.clone()),
            RequestParams::Array(arr) => Value::Array(arr.clone()),
        }
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        RequestParams::Object(map)
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(vec: Vec<Value>) -> Self {
        RequestParams::Array(vec)
    }
}

/// A validated JSON-RPC request or notification.
///
/// Fields are read-only once constructed. Deserializing goes through the same
/// strict validation as [`JsonRpcRequest::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    version: JsonRpcVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<RequestId>,
    method: String,
    params: RequestParams,
}

impl JsonRpcRequest {
    /// Build a request locally. `id: None` builds a notification.
    pub fn new(
        id: Option<RequestId>,
        method: impl Into<String>,
        params: RequestParams,
    ) -> Result<Self, JsonRpcException> {
        let method = method.into();
        if method.is_empty() {
            return Err(JsonRpcException::from_field_errors(&[FieldError::new(
                "method",
                "method must not be empty",
            )]));
        }
        Ok(Self {
            version: JsonRpcVersion::V2_0,
            id,
            method,
            params,
        })
    }

    /// Validate a decoded message without coercing any field.
    ///
    /// Every field is checked and all failures are reported together as the
    /// `data` of a single InvalidRequest.
    pub fn from_value(value: &Value) -> Result<Self, JsonRpcException> {
        let Some(obj) = value.as_object() else {
            return Err(JsonRpcException::from_field_errors(&[FieldError::new(
                "request",
                "request must be an object",
            )]));
        };

        let mut errors = Vec::new();

        let version = check(
            &mut errors,
            "jsonrpc",
            required(obj, "jsonrpc").and_then(JsonRpcVersion::from_value),
        );
        let id = check(
            &mut errors,
            "id",
            obj.get("id").map_or(Ok(None), RequestId::from_value),
        );
        let method = check(
            &mut errors,
            "method",
            required(obj, "method").and_then(method_from_value),
        );
        let params = check(
            &mut errors,
            "params",
            obj.get("params")
                .map_or_else(|| Ok(RequestParams::default()), RequestParams::from_value),
        );

        match (version, id, method, params) {
            (Some(version), Some(id), Some(method), Some(params)) => Ok(Self {
                version,
                id,
                method,
                params,
            }),
            _ => Err(JsonRpcException::from_field_errors(&errors)),
        }
    }

    pub fn version(&self) -> JsonRpcVersion {
        self.version
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// A request without an id (absent or `null`) expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Get a parameter by index (if params are an array)
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.get_index(index)
    }

    pub fn into_parts(self) -> (Option<RequestId>, String, RequestParams) {
        (self.id, self.method, self.params)
    }
}

impl TryFrom<Value> for JsonRpcRequest {
    type Error = JsonRpcException;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, &'static str> {
    obj.get(field).ok_or("field required")
}

fn check<T>(
    errors: &mut Vec<FieldError>,
    field: &str,
    result: Result<T, &'static str>,
) -> Option<T> {
    result
        .map_err(|message| errors.push(FieldError::new(field, message)))
        .ok()
}

fn method_from_value(value: &Value) -> Result<String, &'static str> {
    match value {
        Value::String(s) if s.is_empty() => Err("method must not be empty"),
        Value::String(s) => Ok(s.clone()),
        _ => Err("method must be a string"),
    }
}
