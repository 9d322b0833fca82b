//! Request envelopes sent to the gateway.

use serde::{Deserialize, Serialize};

use crate::method::{Method, VmType};

fn is_zero(v: &i64) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Handshake request body for `/api/contract/shakeHand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeRequest {
    pub access_id: String,
    /// Epoch millis, as a decimal string
    pub time: String,
    /// Hex-encoded signature over `access_id + time`
    pub secret: String,
}

/// Fields shared by every chain call.
///
/// Sent alone as the body of a simple `chainCall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseParam {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_id: String,
    #[serde(rename = "bizid", default, skip_serializing_if = "String::is_empty")]
    pub biz_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hash: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_str: String,
    pub method: Method,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_key: String,
}

impl BaseParam {
    /// Create a base parameter set for a method.
    pub fn new(access_id: impl Into<String>, biz_id: impl Into<String>, method: Method) -> Self {
        Self {
            access_id: access_id.into(),
            biz_id: biz_id.into(),
            hash: String::new(),
            token: String::new(),
            request_str: String::new(),
            method,
            secret_key: String::new(),
        }
    }

    /// Set the transaction hash.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Set the opaque request string.
    pub fn with_request_str(mut self, request_str: impl Into<String>) -> Self {
        self.request_str = request_str.into();
        self
    }
}

/// Body of a `chainCallForBiz` request.
///
/// Empty strings, zero numbers and `false` are left off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRestBizParam {
    #[serde(flatten)]
    pub base: BaseParam,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(rename = "tenantid", default, skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contract_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contract_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub out_types: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method_signature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input_param_list_str: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub native_contract_data: String,
    #[serde(rename = "mykmsKeyId", default, skip_serializing_if = "String::is_empty")]
    pub kms_key_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub block_number: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_local_transaction: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub apply_access_key: String,
    /// Gas limit; 0 means unlimited
    #[serde(default, skip_serializing_if = "is_zero")]
    pub gas: i64,
    #[serde(rename = "vmTypeEnum", default, skip_serializing_if = "Option::is_none")]
    pub vm_type: Option<VmType>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub abi: String,
}

impl CallRestBizParam {
    /// Create an otherwise empty biz call.
    pub fn new(base: BaseParam) -> Self {
        Self {
            base,
            order_id: String::new(),
            account: String::new(),
            content: String::new(),
            tenant_id: String::new(),
            uid: String::new(),
            contract_name: String::new(),
            contract_code: String::new(),
            out_types: String::new(),
            method_signature: String::new(),
            input_param_list_str: String::new(),
            native_contract_data: String::new(),
            kms_key_id: String::new(),
            block_number: 0,
            is_local_transaction: false,
            apply_access_key: String::new(),
            gas: 0,
            vm_type: None,
            abi: String::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.base.method
    }
}

/// Which gateway endpoint a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    ChainCall,
    ChainCallForBiz,
}

impl CallKind {
    /// Endpoint path, relative to the gateway base URL.
    pub fn path(&self) -> &'static str {
        match self {
            CallKind::ChainCall => "/api/contract/chainCall",
            CallKind::ChainCallForBiz => "/api/contract/chainCallForBiz",
        }
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            CallKind::ChainCall => "chainCall",
            CallKind::ChainCallForBiz => "chainCallForBiz",
        }
    }
}

/// A request envelope of either shape.
///
/// Serializes as the inner envelope, so the retry layer can re-stamp the
/// token without caring which shape it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChainRequest {
    Call(BaseParam),
    Biz(CallRestBizParam),
}

impl ChainRequest {
    fn base(&self) -> &BaseParam {
        match self {
            ChainRequest::Call(p) => p,
            ChainRequest::Biz(p) => &p.base,
        }
    }

    fn base_mut(&mut self) -> &mut BaseParam {
        match self {
            ChainRequest::Call(p) => p,
            ChainRequest::Biz(p) => &mut p.base,
        }
    }

    pub fn token(&self) -> &str {
        &self.base().token
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.base_mut().token = token.into();
    }

    pub fn method(&self) -> Method {
        self.base().method
    }

    pub fn biz_id(&self) -> &str {
        &self.base().biz_id
    }

    pub fn kind(&self) -> CallKind {
        match self {
            ChainRequest::Call(_) => CallKind::ChainCall,
            ChainRequest::Biz(_) => CallKind::ChainCallForBiz,
        }
    }
}

/// Request string payload for `QUERYACCOUNT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub query_account: String,
}
