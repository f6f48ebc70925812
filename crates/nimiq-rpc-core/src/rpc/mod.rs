//! Nimiq node JSON-RPC plumbing.
//!
//! Defines the [`Transport`] trait, the [`Dispatcher`] that frames single and
//! batched calls on top of it, the result decoders in [`decode`], and an HTTP
//! implementation ([`HttpTransport`]) plus a test mock (`mock::MockTransport`).

pub mod decode;
mod dispatcher;
mod http_adapter;
#[cfg(test)]
pub mod mock;
mod protocol;

pub use dispatcher::Dispatcher;
pub use http_adapter::{HttpTransport, HttpTransportConfig};
pub use protocol::{BatchResponse, BatchResponses, RpcRequest};

use async_trait::async_trait;

use crate::error::CoreError;

/// One request/response exchange with a node.
///
/// `payload` is a JSON-RPC request object or a batch array of them; the
/// implementation returns the raw response body untouched. Implementations own
/// connection handling, authentication and timeouts, and must be safe to use
/// from several tasks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: &serde_json::Value) -> Result<String, CoreError>;
}
