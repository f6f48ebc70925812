//! Exercises the HTTP transport end to end against an in-process fake node.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use nimiq_rpc_core::rpc::{HttpTransportConfig, RpcRequest};
use nimiq_rpc_core::types::SyncState;
use nimiq_rpc_core::{CoreError, Luna, NimiqClient, RpcError};

// base64("alice:secret")
const BASIC_AUTH: &str = "Basic YWxpY2U6c2VjcmV0";

fn answer(request: &Value) -> Value {
    let id = request["id"].clone();
    let result = match request["method"].as_str() {
        Some("blockNumber") => json!(42),
        Some("getBalance") => json!(1_200_000),
        Some("syncing") => json!(false),
        Some("getTransactionByHash") => Value::Null,
        Some("echoParams") => request["params"].clone(),
        _ => {
            return json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "Method not found" },
            })
        }
    };
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

async fn node(headers: HeaderMap, Json(payload): Json<Value>) -> Result<Json<Value>, StatusCode> {
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
    if auth != Some(BASIC_AUTH) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("k1") {
        return Err(StatusCode::FORBIDDEN);
    }

    let body = match &payload {
        // Batches come back reversed to make correlation by id observable.
        Value::Array(requests) => Value::Array(requests.iter().rev().map(answer).collect()),
        request => answer(request),
    };
    Ok(Json(body))
}

async fn spawn_node() -> String {
    let router = Router::new()
        .route("/", post(node))
        .route("/empty", post(|| async { StatusCode::OK }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake node");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fake node");
    });
    format!("http://{addr}")
}

fn client(url: &str) -> NimiqClient {
    NimiqClient::from_config(
        HttpTransportConfig::new(url)
            .with_credentials("alice", "secret")
            .with_header("X-Api-Key", "k1"),
    )
    .expect("client must construct")
}

#[tokio::test]
async fn typed_calls_over_http() {
    let url = spawn_node().await;
    let nimiq = client(&url);

    assert_eq!(nimiq.block_number().await.expect("height"), 42);
    assert_eq!(
        nimiq.get_balance("NQ01").await.expect("balance"),
        Luna(1_200_000)
    );
    assert_eq!(nimiq.syncing().await.expect("sync"), SyncState::NotSyncing);
    assert_eq!(
        nimiq.get_transaction_by_hash("ff").await.expect("lookup"),
        None
    );
}

#[tokio::test]
async fn node_errors_surface_as_server_errors() {
    let url = spawn_node().await;
    let err = client(&url)
        .call("noSuchMethod", Vec::new())
        .await
        .expect_err("unknown method must fail");
    assert!(matches!(
        err,
        CoreError::Rpc(RpcError::ServerError { code: -32601, .. })
    ));
}

#[tokio::test]
async fn batch_is_correlated_by_id() {
    let url = spawn_node().await;
    let nimiq = client(&url);

    let responses = nimiq
        .call_batch(&[
            RpcRequest::new("blockNumber", Vec::new()),
            RpcRequest::new("noSuchMethod", Vec::new()),
            RpcRequest::new("echoParams", vec![json!("a"), json!(1)]),
        ])
        .await
        .expect("batch must succeed as a whole");

    assert_eq!(responses.len(), 3);
    assert!(responses.has_error());
    let methods: Vec<&str> = responses.iter().map(|r| r.method()).collect();
    assert_eq!(methods, ["blockNumber", "noSuchMethod", "echoParams"]);
    assert_eq!(responses.get(0).and_then(|r| r.result()), Some(&json!(42)));
    assert!(responses.get(1).and_then(|r| r.error()).is_some());
    assert_eq!(
        responses.get(2).and_then(|r| r.result()),
        Some(&json!(["a", 1]))
    );
}

#[tokio::test]
async fn missing_credentials_are_not_authenticated() {
    let url = spawn_node().await;
    let nimiq = NimiqClient::new(&url).expect("client must construct");
    let err = nimiq.block_number().await.expect_err("must be rejected");
    assert!(matches!(err, CoreError::Rpc(RpcError::NotAuthenticated)));
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let url = spawn_node().await;
    let nimiq = NimiqClient::with_auth(&url, "alice", "secret").expect("client must construct");
    let err = nimiq.block_number().await.expect_err("must be rejected");
    assert!(matches!(err, CoreError::Rpc(RpcError::Unauthorized)));
}

#[tokio::test]
async fn empty_body_is_reported() {
    let url = spawn_node().await;
    let err = client(&format!("{url}/empty"))
        .block_number()
        .await
        .expect_err("empty body must fail");
    assert!(matches!(err, CoreError::Rpc(RpcError::EmptyBody)));
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = NimiqClient::new(&format!("http://{addr}"))
        .expect("client must construct")
        .block_number()
        .await
        .expect_err("nothing listens there");
    assert!(matches!(err, CoreError::Rpc(RpcError::Transport(_))));
}
