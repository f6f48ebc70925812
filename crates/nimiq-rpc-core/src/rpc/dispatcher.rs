use tracing::{debug, trace};

use crate::error::{CoreError, RpcError};

use super::protocol::{
    correlate_batch, parse_jsonrpc_error, parse_response_id, JsonRpcResponse,
};
use super::{BatchResponses, RpcRequest, Transport};

/// Id used for non-batched calls. Each call is its own exchange, so no
/// counter needs to be shared between concurrent callers.
const SINGLE_CALL_ID: u64 = 1;

/// Frames JSON-RPC calls and unwraps their envelopes.
///
/// Holds nothing but the transport: one call is one round trip, with no
/// retries, queueing or state carried between calls.
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one request and return its raw `result` (`null` when absent).
    ///
    /// A JSON-RPC `error` member becomes `RpcError::ServerError`.
    pub async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        let id = SINGLE_CALL_ID;
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let payload = RpcRequest::new(method, params).envelope(id);

        let body = self.transport.send(&payload).await?;
        debug!(rpc.id = id, rpc.method = method, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        let decoded: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            RpcError::InvalidResponse(format!("decode JSON-RPC response: {e}; body={body}"))
        })?;

        // A node that could not read the request answers an error with a null id.
        if !(decoded.id.is_null() && decoded.error.is_some()) {
            let answered = parse_response_id(&decoded.id)?;
            if answered != id {
                return Err(RpcError::InvalidResponse(format!(
                    "response id={answered} does not match request id={id}"
                ))
                .into());
            }
        }

        if let Some(err) = decoded.error {
            return Err(parse_jsonrpc_error(err).into());
        }

        Ok(decoded.result.unwrap_or(serde_json::Value::Null))
    }

    /// Send `requests` in one round trip.
    ///
    /// Request `i` goes out with id `i`, and the returned entries are matched
    /// back by that id whatever order the node answers in. Errors carried by
    /// individual entries do not fail the call; check
    /// [`BatchResponses::has_error`].
    pub async fn call_batch(&self, requests: &[RpcRequest]) -> Result<BatchResponses, CoreError> {
        if requests.is_empty() {
            return Ok(BatchResponses::default());
        }

        debug!(rpc.batch_size = requests.len(), "rpc batch call");
        let payload = serde_json::Value::Array(
            (0_u64..)
                .zip(requests)
                .map(|(id, request)| request.envelope(id))
                .collect(),
        );

        let body = self.transport.send(&payload).await?;
        debug!(
            rpc.batch_size = requests.len(),
            body_len = body.len(),
            "rpc batch response"
        );
        trace!(rpc.batch_size = requests.len(), body = %body, "rpc batch response body");

        let decoded: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            RpcError::InvalidResponse(format!("decode JSON-RPC batch response: {e}; body={body}"))
        })?;

        if !decoded.is_array() {
            return Err(rejected_batch_error(&decoded, &body));
        }
        let items: Vec<JsonRpcResponse> = serde_json::from_value(decoded).map_err(|e| {
            RpcError::InvalidResponse(format!("decode JSON-RPC batch item: {e}; body={body}"))
        })?;

        let responses = correlate_batch(requests, items)?;
        debug!(
            rpc.batch_size = responses.len(),
            rpc.batch_has_error = responses.has_error(),
            "rpc batch correlated"
        );
        Ok(responses)
    }
}

// A node that rejects the batch as a whole answers with a single error object
// instead of an array.
fn rejected_batch_error(decoded: &serde_json::Value, body: &str) -> CoreError {
    match decoded.get("error") {
        Some(err) if !err.is_null() => parse_jsonrpc_error(err.clone()).into(),
        _ => RpcError::InvalidResponse(format!("expected JSON-RPC batch array; body={body}")).into(),
    }
}
