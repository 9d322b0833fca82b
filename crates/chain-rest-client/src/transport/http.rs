//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::warn;

use super::traits::*;
use crate::config::PoolSettings;

/// Transport over a pooled reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given keep-alive pool.
    pub fn new(pool: PoolSettings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(pool.idle_timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    ///
    /// The caller is responsible for its pool settings.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        // A truncated body is parsed like any other unreadable body
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!(url, status, error = %e, "Failed to read response body");
                Vec::new()
            }
        };

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_posts_json_and_returns_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/contract/chainCall"))
            .and(header("content-type", JSON_CONTENT_TYPE))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(PoolSettings::default()).unwrap();
        let reply = transport
            .post_json(
                &format!("{}/api/contract/chainCall", mock_server.uri()),
                b"{}".to_vec(),
            )
            .await
            .unwrap();

        assert_eq!(reply.status, 503);
        assert_eq!(reply.body, b"busy");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new(PoolSettings::default()).unwrap();
        let result = transport
            .post_json("http://127.0.0.1:1/api/contract/chainCall", b"{}".to_vec())
            .await;
        assert!(result.is_err());
    }
}
