//! Response envelope and in-band status codes.

use serde::{Deserialize, Serialize};

/// In-band status codes carried in [`BaseResp::code`].
pub mod codes {
    /// Call accepted / result available
    pub const SUCCESS: &str = "200";
    /// Session token expired; handshake again
    pub const SESSION_EXPIRED: &str = "202";
    /// Query has no result yet
    pub const NO_RESULT: &str = "404";
    /// Transaction is waiting for verification
    pub const WAITING_VERIFY: &str = "413";
    /// Transaction is waiting for execution
    pub const WAITING_EXECUTE: &str = "414";
}

/// Response envelope returned by every gateway endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseResp {
    pub success: bool,
    pub code: String,
    /// Payload on success, human-readable message otherwise
    pub data: String,
}

impl BaseResp {
    pub fn new(success: bool, code: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            success,
            code: code.into(),
            data: data.into(),
        }
    }

    /// Parse a response body.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// `success` is set and the code is `200`.
    pub fn is_ok(&self) -> bool {
        self.success && self.code == codes::SUCCESS
    }

    /// The server rejected the session token.
    pub fn is_session_expired(&self) -> bool {
        !self.success && self.code == codes::SESSION_EXPIRED
    }

    /// A failed call with a 5xx code, worth sending again.
    pub fn is_server_failure(&self) -> bool {
        !self.success && self.code.starts_with('5')
    }

    /// A query whose result is not available yet.
    pub fn is_pending(&self) -> bool {
        !self.success
            && matches!(
                self.code.as_str(),
                codes::NO_RESULT | codes::WAITING_VERIFY | codes::WAITING_EXECUTE
            )
    }

    /// Decode `data` as a transaction receipt.
    pub fn receipt(&self) -> serde_json::Result<TransactionReceipt> {
        serde_json::from_str(&self.data)
    }
}

/// Receipt of an executed transaction, as returned by `QUERYRECEIPT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub result: i64,
    pub gas_used: i64,
    /// Base64 encoded contract output
    pub output: String,
}
