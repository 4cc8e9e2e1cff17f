use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use thiserror::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// One JSON POST to an upstream backend.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub body: serde_json::Value,
    pub bearer: Option<String>,
    pub headers: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

impl OutboundRequest {
    pub fn new(url: impl Into<String>, body: serde_json::Value, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            body,
            bearer: None,
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Whatever the upstream answered, 2xx or not.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: StatusCode,
    pub body: String,
}

/// The `Display` text is safe to hand back to callers; `cause` is for logs only.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("could not connect to upstream")]
    Connect { cause: String },

    #[error("upstream request failed")]
    Request { cause: String },
}

impl TransportError {
    pub fn cause(&self) -> &str {
        match self {
            TransportError::Timeout => "timeout",
            TransportError::Connect { cause } | TransportError::Request { cause } => cause,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect {
                cause: err.to_string(),
            }
        } else {
            TransportError::Request {
                cause: err.to_string(),
            }
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Non-2xx statuses come back as `Ok`; only network-level failures are `Err`.
    async fn post_json(&self, request: OutboundRequest) -> Result<RawReply, TransportError>;
}

/// `reqwest`-backed transport. Dropping the returned future aborts the request
/// and closes its connection, so a handler cancelled by a client disconnect
/// leaves nothing behind.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: OutboundRequest) -> Result<RawReply, TransportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .timeout(request.timeout)
            .header("Accept", "application/json")
            .json(&request.body);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawReply { status, body })
    }
}
