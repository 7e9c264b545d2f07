//! JSON-RPC 2.0 Wire Compliance Tests
//!
//! Feeds raw payloads through validation and dispatch and checks the exact
//! shape of what would be written back on the wire.

use async_trait::async_trait;
use serde_json::{Value, json};
use turul_json_rpc_core::prelude::*;
use turul_json_rpc_core::{BatchEntry, validate_decoded};

#[derive(Debug, thiserror::Error)]
#[error("negative input: {0}")]
struct ValueError(i64);

struct MathHandler;

#[async_trait]
impl JsonRpcHandler for MathHandler {
    async fn handle(&self, method: &str, params: &RequestParams) -> Result<Value, MethodError> {
        let numbers: Vec<i64> = match params {
            RequestParams::Array(items) => items.iter().filter_map(Value::as_i64).collect(),
            RequestParams::Object(_) => {
                return Err(JsonRpcException::invalid_params("positional params expected").into());
            }
        };
        match method {
            "sum" => Ok(json!(numbers.iter().sum::<i64>())),
            "sqrt" => match numbers.first() {
                Some(n) if *n < 0 => Err(MethodError::other(ValueError(*n))),
                Some(n) => Ok(json!((*n as f64).sqrt())),
                None => Err(JsonRpcException::invalid_params("one number expected").into()),
            },
            "notify_hello" | "update" => Ok(Value::Null),
            _ => Err(JsonRpcException::method_not_found(method).into()),
        }
    }
}

fn dispatcher() -> JsonRpcDispatcher {
    let mut dispatcher = JsonRpcDispatcher::new();
    dispatcher.set_default_handler(MathHandler);
    dispatcher
}

fn to_wire(reply: &JsonRpcReply) -> Value {
    serde_json::to_value(reply).expect("reply must serialize")
}

fn keys(value: &Value) -> Vec<&str> {
    let mut keys: Vec<&str> = value
        .as_object()
        .expect("response must be an object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    keys
}

fn assert_wire_response(value: &Value) {
    assert_eq!(value["jsonrpc"], "2.0");
    let keys = keys(value);
    assert!(
        keys == ["id", "jsonrpc", "result"] || keys == ["error", "id", "jsonrpc"],
        "unexpected response members: {keys:?}"
    );
    if let Some(error) = value.get("error") {
        assert!(error["code"].is_i64());
        assert!(!error["message"].as_str().unwrap_or_default().is_empty());
    }
}

#[test]
fn test_valid_request_fields_are_not_coerced() {
    let request =
        validate_request(&json!({"jsonrpc": "2.0", "id": 1, "method": "sum", "params": [1, 2]}))
            .unwrap();
    assert_eq!(request.id(), Some(&RequestId::Number(1)));
    assert_eq!(request.method(), "sum");
    assert_eq!(request.params().to_value(), json!([1, 2]));
    assert_eq!(request.version().as_str(), "2.0");
}

#[test]
fn test_id_type_strictness() {
    assert!(validate_request(&json!({"jsonrpc": "2.0", "id": "1", "method": "x"})).is_ok());

    let float = validate_request(&json!({"jsonrpc": "2.0", "id": 1.5, "method": "x"})).unwrap_err();
    assert_eq!(float.kind(), JsonRpcErrorCode::InvalidRequest);

    let boolean = validate_request(&json!({"jsonrpc": "2.0", "id": true, "method": "x"})).unwrap_err();
    assert_eq!(boolean.kind(), JsonRpcErrorCode::InvalidRequest);
}

#[tokio::test]
async fn test_large_integer_id_round_trips() {
    let request =
        validate_request(&json!({"jsonrpc": "2.0", "id": u64::MAX, "method": "x"})).unwrap();
    assert_eq!(request.id(), Some(&RequestId::Unsigned(u64::MAX)));

    let reply = dispatcher()
        .handle_value(&json!({"jsonrpc": "2.0", "id": u64::MAX, "method": "sum", "params": [1]}))
        .await
        .expect("call must be answered");
    let wire = to_wire(&reply);
    assert_wire_response(&wire);
    assert_eq!(wire["id"], json!(u64::MAX));
}

#[test]
fn test_method_is_never_stringified() {
    let err = validate_request(&json!({"jsonrpc": "2.0", "id": 1, "method": 123})).unwrap_err();
    assert_eq!(err.code(), INVALID_REQUEST);
    assert_eq!(err.data()[0]["field"], "method");
}

#[test]
fn test_decode_failures_are_parse_errors() {
    let response = validate_decoded(serde_json::from_str::<Value>("[1, 2")).unwrap_err();
    let wire = serde_json::to_value(&response).unwrap();
    assert_wire_response(&wire);
    assert_eq!(wire["error"]["code"], PARSE_ERROR);
    assert_eq!(wire["id"], Value::Null);
}

#[test]
fn test_batch_entries_are_independent() {
    let JsonRpcPayload::Batch(entries) = validate_payload(&json!([
        {"jsonrpc": "2.0", "id": 1, "method": "sum"},
        {"jsonrpc": "2.0", "id": "bad", "method": ""},
    ]))
    .unwrap() else {
        panic!("expected batch payload");
    };
    assert!(matches!(&entries[0], BatchEntry::Request(r) if r.method() == "sum"));
    assert!(matches!(&entries[1], BatchEntry::Invalid(r) if r.id() == Some(&RequestId::from("bad"))));
}

#[tokio::test]
async fn test_single_call_wire_shape() {
    let _ = tracing_subscriber::fmt::try_init();

    let reply = dispatcher()
        .handle_text(r#"{"jsonrpc": "2.0", "method": "sum", "params": [1, 2, 4], "id": 1}"#)
        .await
        .expect("call must be answered");
    let wire = to_wire(&reply);
    assert_wire_response(&wire);
    assert_eq!(wire, json!({"jsonrpc": "2.0", "id": 1, "result": 7}));
}

#[tokio::test]
async fn test_wrapped_failure_wire_shape() {
    let reply = dispatcher()
        .handle_text(r#"{"jsonrpc": "2.0", "method": "sqrt", "params": [-4], "id": "q"}"#)
        .await
        .expect("call must be answered");
    let wire = to_wire(&reply);
    assert_wire_response(&wire);
    assert_eq!(
        wire,
        json!({
            "jsonrpc": "2.0",
            "id": "q",
            "error": {"code": -32099, "message": "Value error", "data": "negative input: -4"}
        })
    );
}

#[tokio::test]
async fn test_mixed_batch_wire_shape() {
    let reply = dispatcher()
        .handle_text(
            r#"[
                {"jsonrpc": "2.0", "method": "sum", "params": [1, 2, 4], "id": "1"},
                {"jsonrpc": "2.0", "method": "notify_hello", "params": [7]},
                {"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": "2"},
                {"foo": "boo"},
                {"jsonrpc": "2.0", "method": "sum", "params": {"a": 1}, "id": "5"},
                1
            ]"#,
        )
        .await
        .expect("batch must be answered");

    let wire = to_wire(&reply);
    let items = wire.as_array().expect("batch reply must be an array");
    assert_eq!(items.len(), 5, "notification must not produce an entry");
    for item in items {
        assert_wire_response(item);
    }

    assert_eq!(items[0]["result"], 7);
    assert_eq!(items[1]["error"]["code"], METHOD_NOT_FOUND);
    assert_eq!(items[1]["id"], "2");
    assert_eq!(items[2]["error"]["code"], INVALID_REQUEST);
    assert_eq!(items[2]["id"], Value::Null);
    assert_eq!(items[3]["error"]["code"], INVALID_PARAMS);
    assert_eq!(items[4]["error"]["code"], INVALID_REQUEST);
}

#[tokio::test]
async fn test_rpc_examples_without_replies() {
    let dispatcher = dispatcher();

    let single = dispatcher
        .handle_text(r#"{"jsonrpc": "2.0", "method": "update", "params": [1, 2, 3, 4, 5]}"#)
        .await;
    assert!(single.is_none());

    let batch = dispatcher
        .handle_text(
            r#"[
                {"jsonrpc": "2.0", "method": "notify_sum", "params": [1, 2, 4]},
                {"jsonrpc": "2.0", "method": "notify_hello", "params": [7]}
            ]"#,
        )
        .await;
    assert!(batch.is_none());
}

#[tokio::test]
async fn test_invalid_top_level_payloads() {
    let dispatcher = dispatcher();

    for payload in ["[]", "[1]", "1", r#"{"jsonrpc": "2.0", "method": 1, "params": "bar"}"#] {
        let reply = dispatcher.handle_text(payload).await.expect("must be answered");
        let wire = to_wire(&reply);
        let responses = match &wire {
            Value::Array(items) => items.clone(),
            single => vec![single.clone()],
        };
        for response in &responses {
            assert_wire_response(response);
            assert_eq!(response["error"]["code"], INVALID_REQUEST);
            assert_eq!(response["id"], Value::Null);
        }
    }
}

#[test]
fn test_client_side_response_validation() {
    let reply = json!([
        {"jsonrpc": "2.0", "id": 1, "result": 7},
        {"jsonrpc": "2.0", "id": null, "error": {"code": -32600, "message": "Invalid request"}}
    ]);
    let batch = JsonRpcBatchResponse::from_value(&reply).unwrap();
    let kinds: Vec<bool> = batch.iter().map(JsonRpcResponse::is_error).collect();
    assert_eq!(kinds, vec![false, true]);

    let both = json!({"jsonrpc": "2.0", "id": 1, "result": 7, "error": {"code": 1, "message": "m"}});
    assert!(serde_json::from_value::<JsonRpcResponse>(both).is_err());
}
