use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::error_codes;
use crate::response::JsonRpcErrorResponse;
use crate::types::RequestId;

/// The closed set of JSON-RPC error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Base kind for server-defined errors
    ServerError,
    /// A handler failed with an error outside this taxonomy
    MethodExecutionError,
}

impl JsonRpcErrorCode {
    pub const ALL: [JsonRpcErrorCode; 7] = [
        JsonRpcErrorCode::ParseError,
        JsonRpcErrorCode::InvalidRequest,
        JsonRpcErrorCode::MethodNotFound,
        JsonRpcErrorCode::InvalidParams,
        JsonRpcErrorCode::InternalError,
        JsonRpcErrorCode::ServerError,
        JsonRpcErrorCode::MethodExecutionError,
    ];

    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError => error_codes::SERVER_ERROR,
            JsonRpcErrorCode::MethodExecutionError => error_codes::METHOD_EXECUTION_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError => "Server error",
            JsonRpcErrorCode::MethodExecutionError => "Method execution error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object, the `error` member of an error response.
///
/// The message is never empty. Deserializing goes through
/// [`JsonRpcErrorObject::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcErrorObject {
    /// An empty message is replaced by the generic server error message.
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        let message = message.into();
        Self {
            code,
            message: if message.is_empty() {
                JsonRpcErrorCode::ServerError.message().to_string()
            } else {
                message
            },
            data,
        }
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Strictly validate an error object received from a peer.
    ///
    /// Failures are reported against field paths prefixed with `prefix`.
    pub fn from_value(value: &Value, prefix: &str) -> Result<Self, Vec<FieldError>> {
        let Some(obj) = value.as_object() else {
            return Err(vec![FieldError::new(prefix, "must be an object")]);
        };

        let mut errors = Vec::new();

        let code = match obj.get("code") {
            Some(Value::Number(n)) if n.is_i64() => n.as_i64(),
            Some(_) => {
                errors.push(FieldError::new(format!("{prefix}.code"), "must be an integer"));
                None
            }
            None => {
                errors.push(FieldError::new(format!("{prefix}.code"), "field required"));
                None
            }
        };

        let message = match obj.get("message") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::String(_)) => {
                errors.push(FieldError::new(format!("{prefix}.message"), "must not be empty"));
                None
            }
            Some(_) => {
                errors.push(FieldError::new(format!("{prefix}.message"), "must be a string"));
                None
            }
            None => {
                errors.push(FieldError::new(format!("{prefix}.message"), "field required"));
                None
            }
        };

        match (code, message) {
            (Some(code), Some(message)) if errors.is_empty() => Ok(Self {
                code,
                message,
                data: obj.get("data").cloned(),
            }),
            _ => Err(errors),
        }
    }
}

impl TryFrom<Value> for JsonRpcErrorObject {
    type Error = JsonRpcException;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value, "error")
            .map_err(|errors| JsonRpcException::from_field_errors(&errors))
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A classified JSON-RPC failure.
///
/// Every failure that leaves this crate is one of these. The `kind` is taken
/// from the closed taxonomy, `code` and `message` default to the kind's values
/// and may be overridden for server-defined errors.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct JsonRpcException {
    kind: JsonRpcErrorCode,
    code: i64,
    message: String,
    data: Value,
}

impl JsonRpcException {
    pub fn new(kind: JsonRpcErrorCode, data: impl Into<Value>) -> Self {
        Self {
            kind,
            code: kind.code(),
            message: kind.message().to_string(),
            data: data.into(),
        }
    }

    pub fn parse_error(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, data)
    }

    pub fn invalid_request(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, data)
    }

    pub fn method_not_found(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound, data)
    }

    pub fn invalid_params(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, data)
    }

    pub fn internal_error(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, data)
    }

    pub fn server_error(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ServerError, data)
    }

    /// InvalidRequest carrying the failed fields as `data`.
    pub fn from_field_errors(errors: &[FieldError]) -> Self {
        Self::invalid_request(serde_json::to_value(errors).unwrap_or(Value::Null))
    }

    /// Wrap a failure that is not part of the taxonomy.
    ///
    /// The message is derived from `type_name` (see [`humanize_type_name`]) and
    /// `data` carries the failure's display text.
    pub fn method_execution(type_name: &str, detail: impl fmt::Display) -> Self {
        Self::new(JsonRpcErrorCode::MethodExecutionError, detail.to_string())
            .with_message(humanize_type_name(short_type_name(type_name)))
    }

    /// Override the code, e.g. for an application-defined error.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Override the message. Empty messages are ignored.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = message;
        }
        self
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        self.kind
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn as_error(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject {
            code: self.code,
            message: self.message.clone(),
            data: (!self.data.is_null()).then(|| self.data.clone()),
        }
    }

    pub fn into_response(self, id: Option<RequestId>) -> JsonRpcErrorResponse {
        JsonRpcErrorResponse::new(id, self.as_error())
    }
}

/// Failure returned by a method handler.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Already classified, passed through unchanged
    #[error(transparent)]
    Rpc(#[from] JsonRpcException),

    /// Any other error; its concrete type name drives the wrapped message
    #[error("{source}")]
    Other {
        type_name: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl MethodError {
    /// Capture an arbitrary error together with its concrete type name.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<E>();
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        let boxed = match boxed.downcast::<MethodError>() {
            Ok(method_error) => return *method_error,
            Err(boxed) => boxed,
        };
        match boxed.downcast::<JsonRpcException>() {
            Ok(exception) => MethodError::Rpc(*exception),
            Err(source) => MethodError::Other { type_name, source },
        }
    }

    /// Classify into the taxonomy; unclassified failures are wrapped as
    /// MethodExecutionError.
    pub fn into_exception(self) -> JsonRpcException {
        match self {
            MethodError::Rpc(exception) => exception,
            MethodError::Other { type_name, source } => {
                JsonRpcException::method_execution(type_name, source)
            }
        }
    }
}

/// Last path segment of a Rust type name, without generic arguments.
///
/// `std::io::error::Error` becomes `Error`, `app::Wrapper<app::Inner>` becomes
/// `Wrapper`.
pub fn short_type_name(type_name: &str) -> &str {
    let base = type_name
        .split('<')
        .next()
        .unwrap_or(type_name)
        .trim_start_matches('&');
    base.rsplit("::").next().unwrap_or(base)
}

/// Turn a PascalCase type name into a sentence.
///
/// `FileNotFoundError` becomes `File not found error`, `HTTPTimeoutError`
/// becomes `Http timeout error`. Falls back to the generic server error message
/// when the name has no words.
pub fn humanize_type_name(name: &str) -> String {
    let sentence = type_name_words(name).join(" ").to_lowercase();
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => JsonRpcErrorCode::ServerError.message().to_string(),
    }
}

// A word is an uppercase letter followed either by lowercase letters, or by an
// uppercase run that ends before the next word's capital or at end of input.
// Anything else is skipped.
fn type_name_words(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let len = bytes.len();
    let mut words = Vec::new();
    let mut i = 0;

    while i < len {
        if !bytes[i].is_ascii_uppercase() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i + 1;
        if end < len && bytes[end].is_ascii_lowercase() {
            while end < len && bytes[end].is_ascii_lowercase() {
                end += 1;
            }
        } else {
            while end < len && bytes[end].is_ascii_uppercase() {
                end += 1;
            }
            if end < len {
                if end - start < 2 {
                    i += 1;
                    continue;
                }
                end -= 1;
            }
        }

        words.push(&name[start..end]);
        i = end;
    }

    words
}
