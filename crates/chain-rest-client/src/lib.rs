//! Chain REST Client - session-managed access to the chain REST gateway
//!
//! Provides:
//! - RSA-signed handshakes and transparent token renewal
//! - A retrying dispatcher driven by the gateway's in-band codes
//! - Polling for transactions and receipts that are still pending
//! - Business operations (deposit, contracts, accounts)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              RestClient                 │
//! │  (validation, routing, business ops)    │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ Dispatcher  │──────▶│ Session     │
//! │ (retries)   │       │ Manager     │
//! └──────┬──────┘       └──────┬──────┘
//!        └──────────┬──────────┘
//!                   ▼
//!            ┌─────────────┐
//!            │ Transport   │
//!            │ (reqwest)   │
//!            └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use chain_rest_client::{OrderContext, RestClient};
//!
//! # async fn run() -> chain_rest_client::Result<()> {
//! let client = RestClient::from_config_file("rest-client.json").await?;
//! let order = OrderContext::new("biz-1", "order-1", "alice").with_kms_key("kms-1");
//! let tx = client.deposit_sync_with_transaction(&order, "hello", 0).await?;
//! println!("{}", tx.data);
//! # Ok(())
//! # }
//! ```

pub mod business;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod poll;
pub mod session;
pub mod signer;
pub mod transport;

// Re-export main types for convenience
pub use business::{ContractCall, OrderContext};
pub use client::{RestClient, RestClientBuilder};
pub use config::{ConfigError, PoolSettings, RestClientProperties, RetryPolicy};
pub use dispatcher::Dispatcher;
pub use error::{RestClientError, Result};
pub use session::{HandshakeError, SessionManager};
pub use signer::{sign, KeyError, Signer};
pub use transport::{HttpReply, HttpTransport, MockTransport, Transport, TransportError};
