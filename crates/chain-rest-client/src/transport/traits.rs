//! Core trait for sending requests to the gateway.

use async_trait::async_trait;

/// Content type of every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// No response was received.
///
/// Any HTTP status, including 5xx, arrives as an [`HttpReply`] instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Could not connect (refused, DNS, TLS)
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure to complete the exchange
    #[error("request failed: {0}")]
    Request(String),

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 reply carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }
}

/// Sends JSON bodies to the gateway.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` with a JSON content type.
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpReply, TransportError>;
}
