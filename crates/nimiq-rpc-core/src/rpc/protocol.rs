use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::error::{CoreError, RpcError};

use super::decode;

/// A method invocation that can be sent on its own or as part of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<serde_json::Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    pub(super) fn envelope(&self, id: u64) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": self.method,
            "params": self.params,
        })
    }
}

#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    #[serde(default)]
    pub(super) id: serde_json::Value,
    #[serde(default)]
    pub(super) result: Option<serde_json::Value>,
    #[serde(default)]
    pub(super) error: Option<serde_json::Value>,
}

// ==============================================================================
// Batch Responses
// ==============================================================================

/// One entry of a batch, already matched to the request that produced it.
#[derive(Debug)]
pub struct BatchResponse {
    id: u64,
    method: String,
    outcome: Result<serde_json::Value, RpcError>,
}

impl BatchResponse {
    pub(super) fn new(id: u64, method: String, item: JsonRpcResponse) -> Self {
        let outcome = match item.error {
            Some(err) => Err(parse_jsonrpc_error(err)),
            None => Ok(item.result.unwrap_or(serde_json::Value::Null)),
        };
        Self {
            id,
            method,
            outcome,
        }
    }

    /// Correlation id the request was sent with.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn result(&self) -> Option<&serde_json::Value> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RpcError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<serde_json::Value, CoreError> {
        self.outcome.map_err(CoreError::from)
    }

    /// Decode this entry's result into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, CoreError> {
        let method = self.method;
        let raw = self.outcome?;
        decode::decode(&method, raw)
    }
}

/// Responses of a batch call, in the order the requests were given.
///
/// The node may answer a batch in any order; entries are matched back to
/// their request by id before they get here. A batch call succeeds as a
/// whole even when individual entries carry an error; see
/// [`BatchResponses::has_error`].
#[derive(Debug, Default)]
pub struct BatchResponses {
    responses: Vec<BatchResponse>,
}

impl BatchResponses {
    pub(super) fn new(responses: Vec<BatchResponse>) -> Self {
        Self { responses }
    }

    /// True if at least one entry carries a JSON-RPC error.
    pub fn has_error(&self) -> bool {
        self.responses.iter().any(|response| response.error().is_some())
    }

    pub fn by_id(&self, id: u64) -> Option<&BatchResponse> {
        self.responses.iter().find(|response| response.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&BatchResponse> {
        self.responses.get(index)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchResponse> {
        self.responses.iter()
    }
}

impl IntoIterator for BatchResponses {
    type Item = BatchResponse;
    type IntoIter = std::vec::IntoIter<BatchResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResponses {
    type Item = &'a BatchResponse;
    type IntoIter = std::slice::Iter<'a, BatchResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}

/// Match decoded batch items to `requests` by id. Request `i` was sent with
/// id `i`.
pub(super) fn correlate_batch(
    requests: &[RpcRequest],
    items: Vec<JsonRpcResponse>,
) -> Result<BatchResponses, CoreError> {
    let mut by_id: HashMap<u64, JsonRpcResponse> = HashMap::with_capacity(items.len());
    for item in items {
        let id = parse_response_id(&item.id)?;
        if by_id.insert(id, item).is_some() {
            return Err(
                RpcError::InvalidResponse(format!("duplicate batch response id={id}")).into(),
            );
        }
    }

    let mut ordered = Vec::with_capacity(requests.len());
    for (id, request) in (0_u64..).zip(requests) {
        let item = by_id.remove(&id).ok_or(RpcError::MissingBatchItem { id })?;
        ordered.push(BatchResponse::new(id, request.method.clone(), item));
    }

    if !by_id.is_empty() {
        let mut unknown: Vec<u64> = by_id.into_keys().collect();
        unknown.sort_unstable();
        return Err(RpcError::InvalidResponse(format!(
            "batch response contains unknown ids {unknown:?}"
        ))
        .into());
    }

    Ok(BatchResponses::new(ordered))
}

/// Parse a JSON-RPC error value into a structured `RpcError`.
///
/// The JSON-RPC spec defines errors as `{"code": <int>, "message": <string>}`.
/// If the error value matches that shape, we produce a `ServerError`;
/// otherwise we fall back to `InvalidResponse` with the raw JSON.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> RpcError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => RpcError::ServerError {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => RpcError::InvalidResponse(format!("non-standard JSON-RPC error: {err}")),
    }
}

pub(super) fn parse_response_id(id: &serde_json::Value) -> Result<u64, CoreError> {
    if let Some(n) = id.as_u64() {
        return Ok(n);
    }

    if let Some(s) = id.as_str() {
        return s.parse::<u64>().map_err(|e| {
            RpcError::InvalidResponse(format!("invalid response id string: {e}")).into()
        });
    }

    Err(RpcError::InvalidResponse(format!("invalid response id: {id}")).into())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(id: serde_json::Value, result: serde_json::Value) -> JsonRpcResponse {
        JsonRpcResponse {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn requests(methods: &[&str]) -> Vec<RpcRequest> {
        methods
            .iter()
            .map(|method| RpcRequest::new(*method, Vec::new()))
            .collect()
    }

    #[test]
    fn parse_response_id_u64() {
        let val = json!(42);
        assert_eq!(parse_response_id(&val).expect("should parse"), 42);
    }

    #[test]
    fn parse_response_id_string() {
        let val = json!("123");
        assert_eq!(parse_response_id(&val).expect("should parse"), 123);
    }

    #[test]
    fn parse_response_id_invalid() {
        let val = json!(true);
        assert!(parse_response_id(&val).is_err());
    }

    #[test]
    fn parse_jsonrpc_error_standard_shape() {
        let err = parse_jsonrpc_error(json!({ "code": -32601, "message": "Method not found" }));
        assert!(matches!(err, RpcError::ServerError { code: -32601, ref message } if message == "Method not found"));
    }

    #[test]
    fn parse_jsonrpc_error_non_standard_shape() {
        let err = parse_jsonrpc_error(json!("boom"));
        assert!(matches!(err, RpcError::InvalidResponse(_)));
    }

    #[test]
    fn envelope_carries_id_method_and_params() {
        let request = RpcRequest::new("getBalance", vec![json!("NQ01")]);
        assert_eq!(
            request.envelope(7),
            json!({ "jsonrpc": "2.0", "id": 7, "method": "getBalance", "params": ["NQ01"] })
        );
    }

    #[test]
    fn correlate_batch_restores_request_order() {
        let requests = requests(&["accounts", "hashrate", "blockNumber"]);
        let items = vec![
            item(json!(2), json!(1234)),
            item(json!(0), json!([])),
            item(json!("1"), json!(10.5)),
        ];

        let responses = correlate_batch(&requests, items).expect("batch must correlate");
        let methods: Vec<&str> = responses.iter().map(BatchResponse::method).collect();
        assert_eq!(methods, ["accounts", "hashrate", "blockNumber"]);
        assert_eq!(responses.by_id(2).and_then(BatchResponse::result), Some(&json!(1234)));
        assert!(!responses.has_error());
    }

    #[test]
    fn correlate_batch_keeps_entry_errors() {
        let requests = requests(&["accounts", "nope"]);
        let items = vec![
            item(json!(0), json!([])),
            JsonRpcResponse {
                id: json!(1),
                result: None,
                error: Some(json!({ "code": -32601, "message": "Method not found" })),
            },
        ];

        let responses = correlate_batch(&requests, items).expect("batch must correlate");
        assert!(responses.has_error());
        assert!(responses.get(0).and_then(BatchResponse::error).is_none());
        assert!(matches!(
            responses.get(1).and_then(BatchResponse::error),
            Some(RpcError::ServerError { code: -32601, .. })
        ));
    }

    #[test]
    fn correlate_batch_missing_item() {
        let requests = requests(&["accounts", "hashrate"]);
        let err = correlate_batch(&requests, vec![item(json!(0), json!([]))])
            .expect_err("missing id must fail");
        assert!(matches!(
            err,
            CoreError::Rpc(RpcError::MissingBatchItem { id: 1 })
        ));
    }

    #[test]
    fn correlate_batch_duplicate_and_unknown_ids() {
        let requests = requests(&["accounts"]);
        let duplicate = vec![item(json!(0), json!([])), item(json!(0), json!([]))];
        assert!(correlate_batch(&requests, duplicate).is_err());

        let unknown = vec![item(json!(0), json!([])), item(json!(9), json!([]))];
        let err = correlate_batch(&requests, unknown).expect_err("unknown id must fail");
        assert!(err.to_string().contains("unknown ids [9]"));
    }

    #[test]
    fn batch_entry_decodes_its_result() {
        let requests = requests(&["blockNumber"]);
        let responses =
            correlate_batch(&requests, vec![item(json!(0), json!(684057))]).expect("correlate");
        let height: u64 = responses
            .into_iter()
            .next()
            .expect("one entry")
            .decode()
            .expect("must decode");
        assert_eq!(height, 684057);
    }
}
