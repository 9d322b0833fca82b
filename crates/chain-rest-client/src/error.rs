//! Error types for the REST client

use chain_rest_types::ValidationError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::session::HandshakeError;
use crate::signer::KeyError;
use crate::transport::TransportError;

/// REST client error
#[derive(Debug, Error)]
pub enum RestClientError {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Signing key could not be loaded
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    /// Session could not be established
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// Request rejected before sending
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No response from the gateway, after all retries
    #[error("Failed to get {call} response: {source}")]
    Transport {
        call: &'static str,
        #[source]
        source: TransportError,
    },

    /// Gateway answered with an HTTP status of 300 or above
    #[error("{call} returned non 2xx status: {status}")]
    NonSuccessStatus { call: &'static str, status: u16 },

    /// Every attempt ended in a retryable in-band failure
    #[error("{call} did not succeed after {attempts} attempts")]
    RetryExhausted { call: &'static str, attempts: u32 },

    /// Request could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client's cancellation token fired
    #[error("Request cancelled")]
    Cancelled,

    /// A synchronous deposit was not accepted
    #[error("Deposit failed, code: {code}, message: {message}")]
    DepositFailed { code: String, message: String },
}

/// Result type for REST client operations
pub type Result<T> = std::result::Result<T, RestClientError>;
