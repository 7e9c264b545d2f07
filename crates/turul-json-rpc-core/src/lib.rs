//! # Strict JSON-RPC 2.0 Message Core
//!
//! Validation and error classification for JSON-RPC 2.0 endpoints. Raw,
//! already-decoded payloads become validated requests; handler outcomes become
//! spec-conformant responses. No transport code lives here.
//!
//! ## Features
//! - No implicit coercion: a string id is never read as an integer, a numeric
//!   method is never stringified
//! - Closed error taxonomy with the reserved JSON-RPC codes
//! - Success and error responses as distinct variants
//! - Batch validation with per-element error responses
//! - Async dispatcher with the `async` feature

pub mod error;
pub mod request;
pub mod response;
pub mod types;
pub mod validate;

#[cfg(feature = "async")]
pub mod r#async;

pub mod prelude;

// Re-export main types
pub use error::{FieldError, JsonRpcErrorCode, JsonRpcErrorObject, JsonRpcException, MethodError};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{
    JsonRpcBatchResponse, JsonRpcErrorResponse, JsonRpcReply, JsonRpcResponse,
    JsonRpcSuccessResponse,
};
pub use types::{JsonRpcVersion, RequestId};
pub use validate::{
    BatchEntry, JsonRpcPayload, parse_payload, response_for, validate_decoded, validate_payload,
    validate_request,
};

#[cfg(feature = "async")]
pub use r#async::{FunctionHandler, JsonRpcDispatcher, JsonRpcHandler};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Base of the server-defined range
    pub const SERVER_ERROR: i64 = -32000;
    /// Handler failures outside the taxonomy
    pub const METHOD_EXECUTION_ERROR: i64 = -32099;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;

    /// True for codes inside the implementation-defined server range
    pub fn is_server_error(code: i64) -> bool {
        (SERVER_ERROR_START..=SERVER_ERROR_END).contains(&code)
    }
}
