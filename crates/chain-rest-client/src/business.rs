//! Chain operations built on top of the two gateway calls.

use chain_rest_types::{
    codes, AccountRequest, BaseParam, BaseResp, CallRestBizParam, Method,
};
use tracing::{info, warn};

use crate::client::RestClient;
use crate::error::{RestClientError, Result};
use crate::poll::poll_until_settled;

/// Who a business call is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderContext {
    pub biz_id: String,
    pub order_id: String,
    pub account: String,
    pub tenant_id: String,
    /// KMS key the gateway signs the transaction with
    pub kms_key_id: String,
}

impl OrderContext {
    pub fn new(
        biz_id: impl Into<String>,
        order_id: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            biz_id: biz_id.into(),
            order_id: order_id.into(),
            account: account.into(),
            ..Default::default()
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn with_kms_key(mut self, kms_key_id: impl Into<String>) -> Self {
        self.kms_key_id = kms_key_id.into();
        self
    }

    fn to_param(&self, access_id: &str, method: Method) -> CallRestBizParam {
        let mut param = CallRestBizParam::new(BaseParam::new(access_id, &self.biz_id, method));
        param.order_id = self.order_id.clone();
        param.account = self.account.clone();
        param.tenant_id = self.tenant_id.clone();
        param.kms_key_id = self.kms_key_id.clone();
        param
    }
}

/// A contract method invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractCall {
    pub contract_name: String,
    /// e.g. `transfer(identity,int256)`
    pub method_signature: String,
    /// JSON array of arguments
    pub input_param_list_str: String,
    /// JSON array of return types
    pub out_types: String,
    /// Execute locally without creating a transaction
    pub is_local: bool,
}

impl RestClient {
    /// Look up an account.
    pub async fn query_account(&self, biz_id: &str, account: &str) -> Result<BaseResp> {
        let request_str = serde_json::to_string(&AccountRequest {
            query_account: account.to_string(),
        })?;
        self.chain_call("", biz_id, &request_str, Method::QueryAccount)
            .await
    }

    /// Create an account whose key is held in the gateway's KMS.
    pub async fn create_account_with_kms_id(&self, order: &OrderContext) -> Result<BaseResp> {
        let param = order.to_param(self.access_id(), Method::CreateAccount);
        self.chain_call_for_biz(param).await
    }

    /// Store `content` on chain. On success `data` is the transaction hash.
    ///
    /// A `gas` of 0 means unlimited.
    pub async fn deposit(&self, order: &OrderContext, content: &str, gas: i64) -> Result<BaseResp> {
        let mut param = order.to_param(self.access_id(), Method::Deposit);
        param.content = content.to_string();
        param.gas = gas;
        self.chain_call_for_biz(param).await
    }

    /// Deposit, then poll for the resulting transaction.
    pub async fn deposit_sync_with_transaction(
        &self,
        order: &OrderContext,
        content: &str,
        gas: i64,
    ) -> Result<BaseResp> {
        let resp = self.deposit(order, content, gas).await?;
        if !resp.success || resp.code != codes::SUCCESS {
            warn!(code = %resp.code, biz_id = %order.biz_id, "Deposit failed");
            return Err(RestClientError::DepositFailed {
                code: resp.code,
                message: resp.data,
            });
        }

        info!(hash = %resp.data, "Deposit accepted, waiting for transaction");
        self.multiple_query_transaction(&order.biz_id, &resp.data)
            .await
    }

    /// Deploy a Solidity contract.
    pub async fn deploy_contract(
        &self,
        order: &OrderContext,
        contract_name: &str,
        contract_code: &str,
        gas: i64,
    ) -> Result<BaseResp> {
        let mut param = order.to_param(self.access_id(), Method::DeployContractForBiz);
        param.contract_name = contract_name.to_string();
        param.contract_code = contract_code.to_string();
        param.gas = gas;
        self.chain_call_for_biz(param).await
    }

    /// Call a deployed Solidity contract.
    pub async fn call_contract(
        &self,
        order: &OrderContext,
        call: &ContractCall,
        gas: i64,
    ) -> Result<BaseResp> {
        let mut param = order.to_param(self.access_id(), Method::CallContractBiz);
        param.contract_name = call.contract_name.clone();
        param.method_signature = call.method_signature.clone();
        param.input_param_list_str = call.input_param_list_str.clone();
        param.out_types = call.out_types.clone();
        param.is_local_transaction = call.is_local;
        param.gas = gas;
        self.chain_call_for_biz(param).await
    }

    pub async fn query_transaction(&self, biz_id: &str, hash: &str) -> Result<BaseResp> {
        self.query_by_hash(biz_id, hash, Method::QueryTransaction)
            .await
    }

    /// Fetch a receipt once. See [`BaseResp::receipt`] to decode it.
    pub async fn query_receipt(&self, biz_id: &str, hash: &str) -> Result<BaseResp> {
        self.query_by_hash(biz_id, hash, Method::QueryReceipt).await
    }

    /// Query a transaction until it is no longer pending.
    pub async fn multiple_query_transaction(&self, biz_id: &str, hash: &str) -> Result<BaseResp> {
        self.poll_by_hash(biz_id, hash, Method::QueryTransaction)
            .await
    }

    /// Query a receipt until it is no longer pending.
    pub async fn multiple_query_receipt(&self, biz_id: &str, hash: &str) -> Result<BaseResp> {
        self.poll_by_hash(biz_id, hash, Method::QueryReceipt).await
    }

    async fn query_by_hash(&self, biz_id: &str, hash: &str, method: Method) -> Result<BaseResp> {
        let param = CallRestBizParam::new(
            BaseParam::new(self.access_id(), biz_id, method).with_hash(hash),
        );
        self.chain_call_for_biz(param).await
    }

    async fn poll_by_hash(&self, biz_id: &str, hash: &str, method: Method) -> Result<BaseResp> {
        poll_until_settled(self.retry_policy().max_attempts(), self.cancel(), || {
            self.chain_call(hash, biz_id, "", method)
        })
        .await
    }
}
