//! Wire model for the chain REST gateway.
//!
//! Shared between the client SDK and anything that needs to speak the
//! gateway's JSON dialect (mock servers, tooling):
//! - [`Method`] and [`VmType`] enums with their upper-case wire names
//! - request envelopes ([`BaseParam`], [`CallRestBizParam`], [`ChainRequest`])
//! - the response envelope [`BaseResp`] and its in-band [`codes`]
//! - per-method validation of biz-call parameters ([`check_biz_param`])

pub mod method;
pub mod param;
pub mod response;
pub mod validate;

pub use method::{Method, VmType};
pub use param::{AccountRequest, BaseParam, CallKind, CallRestBizParam, ChainRequest, ShakeRequest};
pub use response::{codes, BaseResp, TransactionReceipt};
pub use validate::{check_biz_param, ValidationError};
