/// Failures of the exchange with the node itself.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not authenticated: the node requires valid credentials")]
    NotAuthenticated,

    #[error("unauthorized: the credentials may not call this method")]
    Unauthorized,

    #[error("the HTTP response body was empty")]
    EmptyBody,

    #[error("JSON-RPC server error {code}: {message}")]
    ServerError { code: i64, message: String },

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    #[error("missing JSON-RPC batch item id={id}")]
    MissingBatchItem { id: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure: {0}")]
    Rpc(#[from] RpcError),

    /// The exchange succeeded but the result did not have the expected shape.
    #[error("unexpected result for `{method}`: {source}")]
    UnexpectedResult {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    pub(crate) fn unexpected(method: &str, source: serde_json::Error) -> Self {
        Self::UnexpectedResult {
            method: method.to_owned(),
            source,
        }
    }
}
