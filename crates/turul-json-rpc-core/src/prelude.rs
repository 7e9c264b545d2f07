//! # JSON-RPC Core Prelude
//!
//! Convenient re-exports of the most commonly used types.
//!
//! ```rust
//! use turul_json_rpc_core::prelude::*;
//! ```

// Core JSON-RPC types
pub use crate::error::{JsonRpcErrorCode, JsonRpcErrorObject, JsonRpcException, MethodError};
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{
    JsonRpcBatchResponse, JsonRpcErrorResponse, JsonRpcReply, JsonRpcResponse,
    JsonRpcSuccessResponse,
};
pub use crate::types::{JsonRpcVersion, RequestId};
pub use crate::validate::{JsonRpcPayload, response_for, validate_payload, validate_request};

#[cfg(feature = "async")]
pub use crate::r#async::{FunctionHandler, JsonRpcDispatcher, JsonRpcHandler};

// Standard error codes
pub use crate::error_codes::*;
