//! Session token management.
//!
//! The gateway issues an opaque token in exchange for a signed challenge
//! (`accessId` followed by the current epoch millis). The token is attached
//! to every chain call and replaced whenever the gateway reports it expired.

use std::sync::Arc;

use chain_rest_types::{BaseResp, ShakeRequest};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::signer::Signer;
use crate::transport::{Transport, TransportError};

/// Path of the handshake endpoint.
pub const SHAKE_HAND_PATH: &str = "/api/contract/shakeHand";

/// A session could not be established.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("handshake request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to encode handshake request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Only raised with strict handshakes enabled
    #[error("handshake rejected with code {code}: {message}")]
    Rejected { code: String, message: String },
}

/// Owns the session token of one client.
///
/// Concurrent handshakes are not coordinated; the last one to finish wins.
pub struct SessionManager {
    access_id: String,
    shake_url: String,
    signer: Signer,
    transport: Arc<dyn Transport>,
    token: RwLock<String>,
    strict: bool,
}

impl SessionManager {
    /// Create a manager with no token yet.
    pub fn new(
        access_id: impl Into<String>,
        base_url: &str,
        signer: Signer,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            access_id: access_id.into(),
            shake_url: format!("{}{}", base_url.trim_end_matches('/'), SHAKE_HAND_PATH),
            signer,
            transport,
            token: RwLock::new(String::new()),
            strict: false,
        }
    }

    /// Reject handshake responses that do not report success.
    pub fn with_strict_handshake(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    /// Current session token.
    pub async fn token(&self) -> String {
        self.token.read().await.clone()
    }

    /// Exchange a freshly signed challenge for a new token.
    ///
    /// Not retried. Unless strict, whatever the gateway puts in `data` becomes
    /// the token, even when `success` is false.
    pub async fn handshake(&self) -> Result<String, HandshakeError> {
        info!(access_id = %self.access_id, "Starting handshake");

        let now_millis = chrono::Utc::now().timestamp_millis();
        let challenge = format!("{}{}", self.access_id, now_millis);
        let request = ShakeRequest {
            access_id: self.access_id.clone(),
            time: now_millis.to_string(),
            secret: self.signer.sign(&challenge),
        };
        let body = serde_json::to_vec(&request)?;

        let reply = self
            .transport
            .post_json(&self.shake_url, body)
            .await
            .map_err(|e| {
                warn!(url = %self.shake_url, error = %e, "Handshake request failed");
                HandshakeError::from(e)
            })?;

        let resp = BaseResp::from_slice(&reply.body).unwrap_or_else(|e| {
            warn!(status = reply.status, error = %e, "Unparseable handshake response, using empty token");
            BaseResp::default()
        });

        if self.strict && !resp.success {
            warn!(code = %resp.code, "Handshake rejected");
            return Err(HandshakeError::Rejected {
                code: resp.code,
                message: resp.data,
            });
        }
        if !resp.success {
            warn!(code = %resp.code, "Handshake did not report success, storing token anyway");
        }

        let token = resp.data;
        *self.token.write().await = token.clone();
        info!(token_len = token.len(), "New session token");
        Ok(token)
    }
}
