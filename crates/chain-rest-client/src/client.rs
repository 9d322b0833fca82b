//! The gateway client.

use std::path::Path;
use std::sync::Arc;

use chain_rest_types::{
    check_biz_param, BaseParam, BaseResp, CallRestBizParam, ChainRequest, Method, ValidationError,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument, Span};

use crate::config::{RestClientProperties, RetryPolicy};
use crate::dispatcher::Dispatcher;
use crate::error::{RestClientError, Result};
use crate::session::SessionManager;
use crate::signer::Signer;
use crate::transport::{HttpTransport, Transport};

/// Builder for [`RestClient`].
pub struct RestClientBuilder {
    properties: RestClientProperties,
    transport: Option<Arc<dyn Transport>>,
    span: Option<Span>,
    cancel: Option<CancellationToken>,
}

impl RestClientBuilder {
    /// Create a new builder.
    pub fn new(properties: RestClientProperties) -> Self {
        Self {
            properties,
            transport: None,
            span: None,
            cancel: None,
        }
    }

    /// Send requests through `transport` instead of a pooled HTTP client.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Record client events inside `span`.
    ///
    /// Defaults to `rest_client{access_id}`.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Use an externally owned cancellation token.
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Load the signing key, shake hands and return a ready client.
    pub async fn connect(self) -> Result<RestClient> {
        let Self {
            properties,
            transport,
            span,
            cancel,
        } = self;
        let span =
            span.unwrap_or_else(|| info_span!("rest_client", access_id = %properties.access_id));

        let signer = Signer::from_pem_file(&properties.access_secret)?;
        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::new(properties.pool_settings()).map_err(|source| {
                    RestClientError::Transport {
                        call: "client setup",
                        source,
                    }
                })?,
            ),
        };

        let base_url = properties.base_url().to_string();
        let session = Arc::new(
            SessionManager::new(
                properties.access_id.clone(),
                &base_url,
                signer,
                transport.clone(),
            )
            .with_strict_handshake(properties.strict_handshake),
        );
        session.handshake().instrument(span.clone()).await?;

        let policy = properties.retry_policy();
        let cancel = cancel.unwrap_or_default();
        let dispatcher = Dispatcher::new(
            &base_url,
            transport,
            session.clone(),
            policy,
            cancel.clone(),
        );

        span.in_scope(|| {
            info!(
                url = %base_url,
                max_attempts = policy.max_attempts(),
                backoff_ms = policy.backoff().as_millis() as u64,
                "Client ready"
            )
        });

        Ok(RestClient {
            properties,
            session,
            dispatcher,
            span,
            cancel,
        })
    }
}

/// Session-managed client for the chain REST gateway.
///
/// Shareable across tasks behind an `Arc`.
pub struct RestClient {
    properties: RestClientProperties,
    session: Arc<SessionManager>,
    dispatcher: Dispatcher,
    span: Span,
    cancel: CancellationToken,
}

impl RestClient {
    pub fn builder(properties: RestClientProperties) -> RestClientBuilder {
        RestClientBuilder::new(properties)
    }

    /// Connect with the default HTTP transport.
    pub async fn new(properties: RestClientProperties) -> Result<Self> {
        RestClientBuilder::new(properties).connect().await
    }

    /// Load properties from a JSON file and connect.
    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let properties = RestClientProperties::from_file(path)?;
        Self::new(properties).await
    }

    pub fn access_id(&self) -> &str {
        &self.properties.access_id
    }

    pub fn properties(&self) -> &RestClientProperties {
        &self.properties
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.dispatcher.policy()
    }

    /// Current session token.
    pub async fn token(&self) -> String {
        self.session.token().await
    }

    /// Cancelling this token makes in-flight and future calls fail with
    /// [`RestClientError::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Force a new handshake.
    pub async fn reshake(&self) -> Result<String> {
        Ok(self.session.handshake().instrument(self.span.clone()).await?)
    }

    /// Send a simple call to `/api/contract/chainCall`.
    pub async fn chain_call(
        &self,
        hash: &str,
        biz_id: &str,
        request_str: &str,
        method: Method,
    ) -> Result<BaseResp> {
        if biz_id.is_empty() {
            return Err(ValidationError::Missing { field: "bizid" }.into());
        }

        let mut param = BaseParam::new(self.access_id(), biz_id, method)
            .with_hash(hash)
            .with_request_str(request_str);
        param.token = self.token().await;

        self.send(ChainRequest::Call(param)).await
    }

    /// Validate and send a biz call to `/api/contract/chainCallForBiz`.
    ///
    /// The current token is stamped onto `param` first. `CREATEACCOUNT`,
    /// `DEPLOYNATIVECONTRACT` and `QUERYACCOUNT` without a KMS key go out
    /// as simple calls instead.
    pub async fn chain_call_for_biz(&self, mut param: CallRestBizParam) -> Result<BaseResp> {
        param.base.token = self.token().await;
        check_biz_param(&param)?;

        if param.method().falls_back_to_chain_call() && param.kms_key_id.is_empty() {
            return self
                .chain_call("", &param.base.biz_id, &param.base.request_str, param.method())
                .await;
        }

        self.send(ChainRequest::Biz(param)).await
    }

    pub(crate) async fn send(&self, request: ChainRequest) -> Result<BaseResp> {
        self.dispatcher
            .dispatch(request)
            .instrument(self.span.clone())
            .await
    }

    pub(crate) fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}
