//! Operation kinds understood by the gateway.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operation requested from the gateway.
///
/// Serialized as the upper-case variant name (`DEPOSIT`, `QUERYACCOUNT`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Deposit,
    DepositWithAdmin,
    CallContractBiz,
    CallContractBizAsync,
    DeployContractForBiz,
    UpdateContractForBiz,
    DeployNativeContract,
    CallNativeContractForBiz,
    CallNativeContractForBizAsync,
    DeployWasmContract,
    CallWasmContract,
    CallWasmContractAsync,
    CreateAccount,
    QueryAccount,
    QueryReceipt,
    QueryTransaction,
    QueryReceiptBiz,
    QueryTransactionBiz,
    QueryTenantKmsList,
    ApplyKey,
    ResetApplyKey,
    QueryAccessList,
    FrozenTenant,
    UnfrozenTenant,
}

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Method; 24] = [
        Method::Deposit,
        Method::DepositWithAdmin,
        Method::CallContractBiz,
        Method::CallContractBizAsync,
        Method::DeployContractForBiz,
        Method::UpdateContractForBiz,
        Method::DeployNativeContract,
        Method::CallNativeContractForBiz,
        Method::CallNativeContractForBizAsync,
        Method::DeployWasmContract,
        Method::CallWasmContract,
        Method::CallWasmContractAsync,
        Method::CreateAccount,
        Method::QueryAccount,
        Method::QueryReceipt,
        Method::QueryTransaction,
        Method::QueryReceiptBiz,
        Method::QueryTransactionBiz,
        Method::QueryTenantKmsList,
        Method::ApplyKey,
        Method::ResetApplyKey,
        Method::QueryAccessList,
        Method::FrozenTenant,
        Method::UnfrozenTenant,
    ];

    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Deposit => "DEPOSIT",
            Method::DepositWithAdmin => "DEPOSITWITHADMIN",
            Method::CallContractBiz => "CALLCONTRACTBIZ",
            Method::CallContractBizAsync => "CALLCONTRACTBIZASYNC",
            Method::DeployContractForBiz => "DEPLOYCONTRACTFORBIZ",
            Method::UpdateContractForBiz => "UPDATECONTRACTFORBIZ",
            Method::DeployNativeContract => "DEPLOYNATIVECONTRACT",
            Method::CallNativeContractForBiz => "CALLNATIVECONTRACTFORBIZ",
            Method::CallNativeContractForBizAsync => "CALLNATIVECONTRACTFORBIZASYNC",
            Method::DeployWasmContract => "DEPLOYWASMCONTRACT",
            Method::CallWasmContract => "CALLWASMCONTRACT",
            Method::CallWasmContractAsync => "CALLWASMCONTRACTASYNC",
            Method::CreateAccount => "CREATEACCOUNT",
            Method::QueryAccount => "QUERYACCOUNT",
            Method::QueryReceipt => "QUERYRECEIPT",
            Method::QueryTransaction => "QUERYTRANSACTION",
            Method::QueryReceiptBiz => "QUERYRECEIPTBIZ",
            Method::QueryTransactionBiz => "QUERYTRANSACTIONBIZ",
            Method::QueryTenantKmsList => "QUERYTENANTKMSLIST",
            Method::ApplyKey => "APPLYKEY",
            Method::ResetApplyKey => "RESETAPPLYKEY",
            Method::QueryAccessList => "QUERYACCESSLIST",
            Method::FrozenTenant => "FROZENTENANT",
            Method::UnfrozenTenant => "UNFROZENTENANT",
        }
    }

    /// Whether a biz call for this method must carry a `uid` or `mykmsKeyId`.
    ///
    /// Queries and tenant/key administration run without a signing identity.
    pub fn requires_signer(&self) -> bool {
        !matches!(
            self,
            Method::QueryTenantKmsList
                | Method::DepositWithAdmin
                | Method::ApplyKey
                | Method::QueryAccessList
                | Method::ResetApplyKey
                | Method::CreateAccount
                | Method::DeployNativeContract
                | Method::QueryAccount
                | Method::QueryReceipt
                | Method::QueryTransaction
                | Method::QueryReceiptBiz
                | Method::QueryTransactionBiz
                | Method::FrozenTenant
                | Method::UnfrozenTenant
        )
    }

    /// Whether a biz call for this method must carry an `orderId`.
    pub fn requires_order_id(&self) -> bool {
        !matches!(
            self,
            Method::ApplyKey
                | Method::QueryAccessList
                | Method::ResetApplyKey
                | Method::QueryReceipt
                | Method::QueryTransaction
                | Method::FrozenTenant
                | Method::UnfrozenTenant
        )
    }

    /// Methods that go through the simple `chainCall` path when no KMS key is given.
    pub fn falls_back_to_chain_call(&self) -> bool {
        matches!(
            self,
            Method::CreateAccount | Method::DeployNativeContract | Method::QueryAccount
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| format!("unknown method: {}", s))
    }
}

/// Virtual machine a contract targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VmType {
    Native,
    Evm,
    Wasm,
    NativePrecompile,
}
