//! Simple Calculator JSON-RPC Example
//!
//! Feeds raw JSON text through validation and dispatch, showing strict id and
//! method handling, batch replies and notification suppression.

use async_trait::async_trait;
use serde_json::{Value, json};
use turul_json_rpc_core::{
    JsonRpcDispatcher, JsonRpcException, JsonRpcHandler, MethodError, RequestParams,
};

#[derive(Debug, thiserror::Error)]
#[error("cannot divide {0} by zero")]
struct ZeroDivisionError(f64);

/// Calculator handler that implements basic arithmetic operations
struct CalculatorHandler;

#[async_trait]
impl JsonRpcHandler for CalculatorHandler {
    async fn handle(&self, method: &str, params: &RequestParams) -> Result<Value, MethodError> {
        let operand = |name: &str, index: usize| {
            params
                .get(name)
                .or_else(|| params.get_index(index))
                .and_then(Value::as_f64)
                .ok_or_else(|| {
                    JsonRpcException::invalid_params(format!("'{name}' must be a number"))
                })
        };
        let a = operand("a", 0)?;
        let b = operand("b", 1)?;

        match method {
            "add" => Ok(json!(a + b)),
            "subtract" => Ok(json!(a - b)),
            "divide" if b == 0.0 => Err(MethodError::other(ZeroDivisionError(a))),
            "divide" => Ok(json!(a / b)),
            _ => Err(JsonRpcException::method_not_found(method).into()),
        }
    }

    fn supported_methods(&self) -> Vec<String> {
        vec!["add".to_string(), "subtract".to_string(), "divide".to_string()]
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Simple Calculator JSON-RPC Example");
    println!("==================================");

    let mut dispatcher = JsonRpcDispatcher::new();
    dispatcher.register_methods(CalculatorHandler.supported_methods(), CalculatorHandler);

    let payloads = [
        r#"{"jsonrpc": "2.0", "method": "add", "params": {"a": 5, "b": 3}, "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": [10, 4], "id": "two"}"#,
        r#"{"jsonrpc": "2.0", "method": "divide", "params": [1, 0], "id": 3}"#,
        r#"{"jsonrpc": "2.0", "method": "multiply", "params": [2, 3], "id": 4}"#,
        r#"{"jsonrpc": "2.0", "method": "add", "params": {"a": "5", "b": 3}, "id": 5}"#,
        r#"{"jsonrpc": "2.0", "method": 42, "id": 6}"#,
        r#"{"jsonrpc": "2.0", "method": "add", "params": [1, 1], "id": 7.5}"#,
        r#"{"jsonrpc": "2.0", "method": "add", "params": [1, 1]}"#,
        r#"[{"jsonrpc": "2.0", "method": "add", "params": [1, 2], "id": 8}, {"jsonrpc": "1.0", "method": "add", "id": 9}]"#,
        r#"[]"#,
        r#"{"jsonrpc": "2.0", "method""#,
    ];

    for (i, payload) in payloads.iter().enumerate() {
        println!("\n--- Payload {} ---", i + 1);
        println!("Request: {}", payload);

        match dispatcher.handle_text(payload).await {
            Some(reply) => match serde_json::to_string_pretty(&reply) {
                Ok(json) => println!("Response:\n{}", json),
                Err(e) => println!("Failed to serialize response: {}", e),
            },
            None => println!("Notification, no response sent"),
        }
    }
}
