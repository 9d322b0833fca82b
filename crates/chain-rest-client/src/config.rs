//! Client configuration.
//!
//! Properties are read from a JSON file with PascalCase keys:
//!
//! ```json
//! {
//!   "RestUrl": "https://gateway.example.com",
//!   "AccessId": "my-access-id",
//!   "AccessSecret": "access.key",
//!   "RetryMaxAttempts": 5,
//!   "BackOffPeriod": 500
//! }
//! ```
//!
//! Numeric settings left out (or set to 0) fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_IDLE_CONNS: usize = 10;
pub const DEFAULT_IDLE_CONN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACK_OFF_PERIOD_MS: u64 = 500;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Gateway connection properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RestClientProperties {
    /// Gateway base URL
    pub rest_url: String,
    /// Access ID issued by the gateway
    pub access_id: String,
    /// Path to the PEM private key used to sign handshakes
    pub access_secret: PathBuf,
    /// Idle connections kept per host (default: 10)
    pub max_idle_conns: usize,
    /// Idle connection timeout in seconds (default: 30)
    pub idle_conn_timeout: u64,
    /// Attempts per call (default: 5)
    pub retry_max_attempts: u32,
    /// Wait between attempts after a transport failure, in millis (default: 500)
    pub back_off_period: u64,
    /// Only accept a handshake token when the gateway reports success
    pub strict_handshake: bool,
}

impl RestClientProperties {
    /// Create properties with the required fields set.
    pub fn new(
        rest_url: impl Into<String>,
        access_id: impl Into<String>,
        access_secret: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rest_url: rest_url.into(),
            access_id: access_id.into(),
            access_secret: access_secret.into(),
            ..Default::default()
        }
    }

    /// Parse properties from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load properties from a JSON file.
    ///
    /// A relative `AccessSecret` is taken relative to the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut properties: Self =
            serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if !properties.access_secret.as_os_str().is_empty() && properties.access_secret.is_relative()
        {
            if let Some(dir) = path.parent() {
                properties.access_secret = dir.join(&properties.access_secret);
            }
        }
        Ok(properties)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.rest_url.trim_end_matches('/')
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_properties(self)
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings::from_properties(self)
    }
}

/// Attempt bound and fixed backoff for dispatching calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACK_OFF_PERIOD_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_properties(properties: &RestClientProperties) -> Self {
        let max_attempts = match properties.retry_max_attempts {
            0 => DEFAULT_RETRY_MAX_ATTEMPTS,
            n => n,
        };
        let backoff_ms = match properties.back_off_period {
            0 => DEFAULT_BACK_OFF_PERIOD_MS,
            n => n,
        };
        Self::new(max_attempts, Duration::from_millis(backoff_ms))
    }

    /// Attempts per call, at least 1.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before retrying after a transport failure.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

/// Keep-alive pool settings handed to the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_idle_per_host: usize,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_per_host: DEFAULT_MAX_IDLE_CONNS,
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_CONN_TIMEOUT_SECS),
        }
    }
}

impl PoolSettings {
    pub fn from_properties(properties: &RestClientProperties) -> Self {
        let max_idle_per_host = match properties.max_idle_conns {
            0 => DEFAULT_MAX_IDLE_CONNS,
            n => n,
        };
        let idle_secs = match properties.idle_conn_timeout {
            0 => DEFAULT_IDLE_CONN_TIMEOUT_SECS,
            n => n,
        };
        Self {
            max_idle_per_host,
            idle_timeout: Duration::from_secs(idle_secs),
        }
    }
}
