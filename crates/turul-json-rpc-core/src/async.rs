use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, join_all};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{JsonRpcException, MethodError},
    request::{JsonRpcRequest, RequestParams},
    response::{JsonRpcBatchResponse, JsonRpcReply, JsonRpcResponse},
    validate::{BatchEntry, JsonRpcPayload, parse_payload, response_for, validate_payload},
};

/// Trait for handling JSON-RPC method calls
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    /// Handle a validated call.
    ///
    /// Return a [`JsonRpcException`] (via `?` or `.into()`) for protocol errors
    /// and [`MethodError::other`] for anything else.
    async fn handle(&self, method: &str, params: &RequestParams) -> Result<Value, MethodError>;

    /// List supported methods (optional - used for introspection)
    fn supported_methods(&self) -> Vec<String> {
        vec![]
    }
}

type HandlerFn =
    dyn Fn(RequestParams) -> BoxFuture<'static, Result<Value, MethodError>> + Send + Sync;

/// A handler backed by a closure returning a boxed future
pub struct FunctionHandler {
    handler_fn: Box<HandlerFn>,
}

impl FunctionHandler {
    pub fn new<F>(handler_fn: F) -> Self
    where
        F: Fn(RequestParams) -> BoxFuture<'static, Result<Value, MethodError>> + Send + Sync + 'static,
    {
        Self {
            handler_fn: Box::new(handler_fn),
        }
    }
}

#[async_trait]
impl JsonRpcHandler for FunctionHandler {
    async fn handle(&self, _method: &str, params: &RequestParams) -> Result<Value, MethodError> {
        (self.handler_fn)(params.clone()).await
    }
}

/// JSON-RPC method dispatcher.
///
/// Resolves method names to handlers, never answers notifications and runs
/// the elements of a batch concurrently while keeping their order.
#[derive(Default)]
pub struct JsonRpcDispatcher {
    handlers: HashMap<String, Arc<dyn JsonRpcHandler>>,
    default_handler: Option<Arc<dyn JsonRpcHandler>>,
}

impl JsonRpcDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific method
    pub fn register_method<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Register a handler for multiple methods
    pub fn register_methods<H>(&mut self, methods: Vec<String>, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        let handler_arc: Arc<dyn JsonRpcHandler> = Arc::new(handler);
        for method in methods {
            self.handlers.insert(method, handler_arc.clone());
        }
    }

    /// Set a default handler for unregistered methods
    pub fn set_default_handler<H>(&mut self, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        self.default_handler = Some(Arc::new(handler));
    }

    /// Get all registered methods
    pub fn registered_methods(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Run one validated request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let handler = self
            .handlers
            .get(request.method())
            .or(self.default_handler.as_ref());

        let outcome = match handler {
            Some(handler) => {
                debug!("Processing JSON-RPC request: method={}", request.method());
                handler.handle(request.method(), request.params()).await
            }
            None => Err(JsonRpcException::method_not_found(request.method()).into()),
        };

        if request.is_notification() {
            if let Err(err) = outcome {
                warn!("Notification {} failed: {}", request.method(), err);
            }
            return None;
        }

        let (id, _, _) = request.into_parts();
        Some(response_for(id, outcome))
    }

    /// Run a validated payload. Returns `None` when nothing must be sent back.
    pub async fn handle_payload(&self, payload: JsonRpcPayload) -> Option<JsonRpcReply> {
        match payload {
            JsonRpcPayload::Single(request) => {
                self.handle_request(request).await.map(JsonRpcReply::Single)
            }
            JsonRpcPayload::Batch(entries) => {
                let responses = join_all(entries.into_iter().map(|entry| async move {
                    match entry {
                        BatchEntry::Request(request) => self.handle_request(request).await,
                        BatchEntry::Invalid(response) => Some(response.into()),
                    }
                }))
                .await;

                let batch: JsonRpcBatchResponse = responses.into_iter().flatten().collect();
                if batch.is_empty() {
                    debug!("Batch contained only notifications, no reply");
                    None
                } else {
                    Some(JsonRpcReply::Batch(batch))
                }
            }
        }
    }

    /// Validate and run a decoded payload
    pub async fn handle_value(&self, value: &Value) -> Option<JsonRpcReply> {
        match validate_payload(value) {
            Ok(payload) => self.handle_payload(payload).await,
            Err(response) => Some(JsonRpcReply::Single(response.into())),
        }
    }

    /// Decode, validate and run a JSON text payload
    pub async fn handle_text(&self, text: &str) -> Option<JsonRpcReply> {
        match parse_payload(text) {
            Ok(payload) => self.handle_payload(payload).await,
            Err(response) => Some(JsonRpcReply::Single(response.into())),
        }
    }
}
