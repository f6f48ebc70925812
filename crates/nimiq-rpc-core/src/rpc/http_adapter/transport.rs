use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode, Url};
use tracing::debug;

use crate::error::{CoreError, RpcError};

use super::super::Transport;
use super::connection::{build_headers, parse_connection, resolve_auth};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// `http://` or `https://` endpoint of the node.
    pub url: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Extra headers sent verbatim with every request.
    pub headers: Vec<(String, String)>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl HttpTransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            pass: None,
            headers: Vec::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.pass = Some(pass.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Nimiq node JSON-RPC transport over HTTP(S).
///
/// Credentials become a basic `Authorization` header on each request. The
/// underlying `reqwest::Client` pools connections and is safe to share
/// between tasks.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    auth: Option<(String, String)>,
}

impl HttpTransport {
    /// Create a transport for `config.url`.
    ///
    /// Fails if the URL is not HTTP(S), if only one of user/password is set,
    /// or if a static header is not a valid HTTP header.
    pub fn new(config: HttpTransportConfig) -> Result<Self, CoreError> {
        let auth = resolve_auth(config.user.as_deref(), config.pass.as_deref())?;
        let url = parse_connection(&config.url)?;
        let default_headers = build_headers(&config.headers)?;

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(RpcError::Transport)?;

        Ok(Self { client, url, auth })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: &serde_json::Value) -> Result<String, CoreError> {
        let mut builder = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(payload);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => return Err(RpcError::NotAuthenticated.into()),
            StatusCode::FORBIDDEN => return Err(RpcError::Unauthorized.into()),
            _ => {}
        }

        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(url = %self.url, %status, body_len = body.len(), "rpc http exchange");

        if body.trim().is_empty() {
            return Err(RpcError::EmptyBody.into());
        }
        Ok(body)
    }
}
