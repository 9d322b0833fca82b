//! Client-side validation of biz-call parameters.
//!
//! A request that fails here is never sent.

use thiserror::Error;

use crate::method::Method;
use crate::param::CallRestBizParam;

/// A request is missing something the gateway requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A field every call needs
    #[error("no {field}")]
    Missing { field: &'static str },

    /// A field the given method needs
    #[error("{method} method must have {field}")]
    MissingForMethod { method: Method, field: &'static str },
}

impl ValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field } => field,
            ValidationError::MissingForMethod { field, .. } => field,
        }
    }
}

/// Check that a biz call carries what its method requires.
///
/// Identity fields (`accessId`, `token`, `bizid`) and the signer are checked
/// first and fail fast. The remaining per-method checks all run and the last
/// missing field is reported.
pub fn check_biz_param(param: &CallRestBizParam) -> Result<(), ValidationError> {
    let base = &param.base;
    if base.access_id.is_empty() {
        return Err(ValidationError::Missing { field: "accessId" });
    }
    if base.token.is_empty() {
        return Err(ValidationError::Missing { field: "token" });
    }
    if base.biz_id.is_empty() {
        return Err(ValidationError::Missing { field: "bizid" });
    }

    let method = base.method;
    if method.requires_signer() && param.uid.is_empty() && param.kms_key_id.is_empty() {
        return Err(ValidationError::MissingForMethod {
            method,
            field: "uid or mykmsKeyId",
        });
    }

    let mut failure = None;
    let mut require = |value: &str, field: &'static str| {
        if value.is_empty() {
            failure = Some(ValidationError::MissingForMethod { method, field });
        }
    };

    if method.requires_order_id() {
        require(&param.order_id, "orderId");
    }

    match method {
        Method::Deposit => {
            require(&param.account, "account");
            require(&param.content, "content");
        }
        Method::CallContractBiz | Method::CallContractBizAsync => {
            require(&param.account, "account");
            require(&param.contract_name, "contractName");
            require(&param.out_types, "outTypes");
            require(&param.method_signature, "methodSignature");
            require(&param.input_param_list_str, "inputParamListStr");
        }
        Method::QueryReceipt | Method::QueryTransaction => {
            require(&base.hash, "hash");
        }
        Method::DeployContractForBiz => {
            require(&param.account, "account");
            require(&param.contract_name, "contractName");
            require(&param.contract_code, "contractCode");
        }
        Method::CreateAccount => {
            require(&param.account, "account");
            require(&param.kms_key_id, "mykmsKeyId");
        }
        _ => {}
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
