use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a JSON-RPC request.
///
/// Only an integer or a string is a valid identifier. A missing or `null` id is
/// represented as `Option::None` by the types that carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
}

impl RequestId {
    /// Strictly read an identifier out of a structured value.
    ///
    /// `Ok(None)` for `null`, `Ok(Some(_))` for an integer or a string. Floats,
    /// booleans, arrays and objects are rejected and never converted.
    pub fn from_value(value: &Value) -> Result<Option<Self>, &'static str> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(RequestId::String(s.clone()))),
            Value::Number(n) if n.is_f64() => Err("id must be an integer or a string, not a float"),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(n), _) => Ok(Some(RequestId::Number(n))),
                (None, Some(n)) => Ok(Some(RequestId::Unsigned(n))),
                (None, None) => Err("id must be an integer or a string"),
            },
            Value::Bool(_) => Err("id must be an integer or a string, not a boolean"),
            Value::Array(_) => Err("id must be an integer or a string, not an array"),
            Value::Object(_) => Err("id must be an integer or a string, not an object"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            RequestId::Unsigned(n) => i64::try_from(*n).ok(),
            RequestId::String(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RequestId::Number(n) => u64::try_from(*n).ok(),
            RequestId::Unsigned(n) => Some(*n),
            RequestId::String(_) => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Unsigned(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => crate::JSONRPC_VERSION,
        }
    }

    /// Accepts exactly the string `"2.0"`; `2.0` as a number or `"2"` are rejected.
    pub fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::String(s) if s == crate::JSONRPC_VERSION => Ok(JsonRpcVersion::V2_0),
            Value::String(_) => Err("jsonrpc must be exactly \"2.0\""),
            _ => Err("jsonrpc must be the string \"2.0\""),
        }
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            crate::JSONRPC_VERSION => Ok(JsonRpcVersion::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: {}",
                s
            ))),
        }
    }
}
