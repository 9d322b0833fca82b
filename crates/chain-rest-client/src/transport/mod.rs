//! HTTP transport abstraction.
//!
//! - [`HttpTransport`]: reqwest with a keep-alive pool
//! - [`MockTransport`]: scripted replies for tests

pub mod http;
pub mod mock;
pub mod traits;

pub use http::HttpTransport;
pub use mock::MockTransport;
pub use traits::{HttpReply, Transport, TransportError, JSON_CONTENT_TYPE};
