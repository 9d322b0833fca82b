//! Retrying dispatch of chain calls.
//!
//! Each attempt POSTs the envelope and sorts the outcome into one of:
//!
//! | outcome | action |
//! |---|---|
//! | no response | wait `backoff`, retry (last attempt: transport error) |
//! | HTTP status >= 300 | fail at once, not retried |
//! | `success=false`, code `202` | handshake again, re-stamp token, retry now |
//! | `success=false`, code `5xx` | retry now |
//! | anything else | return the envelope as-is |
//!
//! Running out of attempts on in-band retries yields `RetryExhausted`.

use std::sync::Arc;

use chain_rest_types::{BaseResp, ChainRequest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::RetryPolicy;
use crate::error::{RestClientError, Result};
use crate::session::SessionManager;
use crate::transport::Transport;

/// Sends chain calls with retries and transparent session renewal.
pub struct Dispatcher {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionManager>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Arc<SessionManager>,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            policy,
            cancel,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Send `request` until it reaches a final answer.
    ///
    /// A returned envelope may still carry `success=false`; only the retry
    /// decision is made here.
    pub async fn dispatch(&self, mut request: ChainRequest) -> Result<BaseResp> {
        let kind = request.kind();
        let call = kind.name();
        let url = format!("{}{}", self.base_url, kind.path());
        let attempts = self.policy.max_attempts();

        for attempt in 1..=attempts {
            if self.cancel.is_cancelled() {
                return Err(RestClientError::Cancelled);
            }

            let body = serde_json::to_vec(&request)?;
            let reply = match self.transport.post_json(&url, body).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!(call, attempt, error = %e, "Failed to get response");
                    if attempt == attempts {
                        return Err(RestClientError::Transport { call, source: e });
                    }
                    self.backoff().await?;
                    info!(call, attempt = attempt + 1, "Retrying request");
                    continue;
                }
            };

            if reply.status >= 300 {
                warn!(call, status = reply.status, "Non 2xx status");
                return Err(RestClientError::NonSuccessStatus {
                    call,
                    status: reply.status,
                });
            }

            let resp = BaseResp::from_slice(&reply.body).unwrap_or_else(|e| {
                warn!(call, error = %e, "Unparseable response body, treating as failure");
                BaseResp::default()
            });
            debug!(
                call,
                method = %request.method(),
                biz_id = request.biz_id(),
                success = resp.success,
                code = %resp.code,
                "Request and response"
            );

            if resp.is_session_expired() {
                warn!(call, attempt, "Session expired, shaking hand again");
                match self.session.handshake().await {
                    Ok(token) => request.set_token(token),
                    Err(e) => warn!(call, error = %e, "Re-handshake failed, keeping old token"),
                }
                continue;
            }
            if resp.is_server_failure() {
                warn!(call, attempt, code = %resp.code, "Server failure, retrying");
                continue;
            }
            return Ok(resp);
        }

        error!(call, attempts, "Retry attempts exhausted");
        Err(RestClientError::RetryExhausted { call, attempts })
    }

    async fn backoff(&self) -> Result<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(RestClientError::Cancelled),
            _ = tokio::time::sleep(self.policy.backoff()) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::Signer;
    use crate::transport::{HttpReply, MockTransport};
    use chain_rest_types::{BaseParam, Method};
    use std::path::Path;
    use std::time::Duration;

    const BACKOFF: Duration = Duration::from_millis(500);

    async fn setup(
        transport: MockTransport,
        max_attempts: u32,
    ) -> (Dispatcher, Arc<MockTransport>, CancellationToken) {
        setup_with(transport, RetryPolicy::new(max_attempts, BACKOFF), false).await
    }

    async fn setup_with(
        transport: MockTransport,
        policy: RetryPolicy,
        strict: bool,
    ) -> (Dispatcher, Arc<MockTransport>, CancellationToken) {
        let transport = Arc::new(transport);
        let signer = Signer::from_pem_file(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/access.key"),
        )
        .unwrap();
        let session = Arc::new(
            SessionManager::new("access", "http://gw", signer, transport.clone())
                .with_strict_handshake(strict),
        );
        session.handshake().await.unwrap();

        let cancel = CancellationToken::new();
        let dispatcher = Dispatcher::new(
            "http://gw",
            transport.clone(),
            session,
            policy,
            cancel.clone(),
        );
        (dispatcher, transport, cancel)
    }

    fn request() -> ChainRequest {
        let mut base = BaseParam::new("access", "b1", Method::QueryAccount);
        base.token = "token-1".into();
        ChainRequest::Call(base)
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_then_success() {
        let n = 3;
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_transport_failures(n)
                .with_response(BaseResp::new(true, "200", "done")),
            n as u32 + 1,
        )
        .await;

        let start = tokio::time::Instant::now();
        let resp = dispatcher.dispatch(request()).await.unwrap();

        assert_eq!(resp.data, "done");
        assert_eq!(transport.call_count(), n + 1);
        assert_eq!(start.elapsed(), BACKOFF * n as u32);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_on_last_attempt() {
        let (dispatcher, transport, _) =
            setup(MockTransport::new().with_transport_failures(2), 2).await;

        let start = tokio::time::Instant::now();
        let err = dispatcher.dispatch(request()).await.unwrap_err();

        assert!(matches!(
            err,
            RestClientError::Transport {
                call: "chainCall",
                ..
            }
        ));
        assert_eq!(transport.call_count(), 2);
        // No wait after the final attempt
        assert_eq!(start.elapsed(), BACKOFF);
    }

    #[tokio::test]
    async fn test_session_expired_rehandshakes_once() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_response(BaseResp::new(false, "202", "token expired"))
                .with_response(BaseResp::new(true, "200", "ok")),
            5,
        )
        .await;

        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert!(resp.success);
        // One at setup, one on expiry
        assert_eq!(transport.handshake_count(), 2);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body["token"], "token-1");
        assert_eq!(requests[1].body["token"], "token-2");
    }

    fn sent_tokens(transport: &MockTransport) -> Vec<String> {
        transport
            .requests()
            .iter()
            .map(|r| r.body["token"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_failed_rehandshake_keeps_old_token_and_counts_attempt() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_handshake_failures_after(1)
                .with_response(BaseResp::new(false, "202", "token expired"))
                .with_response(BaseResp::new(false, "202", "token expired")),
            2,
        )
        .await;

        let err = dispatcher.dispatch(request()).await.unwrap_err();
        assert!(matches!(
            err,
            RestClientError::RetryExhausted { attempts: 2, .. }
        ));
        assert_eq!(sent_tokens(&transport), ["token-1", "token-1"]);
        // One at setup, one failed renewal per expired answer
        assert_eq!(transport.handshake_count(), 3);
    }

    #[tokio::test]
    async fn test_failed_rehandshake_then_success() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_handshake_failures_after(1)
                .with_response(BaseResp::new(false, "202", "token expired"))
                .with_response(BaseResp::new(true, "200", "ok")),
            5,
        )
        .await;

        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(sent_tokens(&transport), ["token-1", "token-1"]);
        assert_eq!(transport.handshake_count(), 2);
    }

    #[tokio::test]
    async fn test_strict_rehandshake_rejection_keeps_old_token() {
        let (dispatcher, transport, _) = setup_with(
            MockTransport::new()
                .with_handshake_rejections_after(1)
                .with_response(BaseResp::new(false, "202", "token expired"))
                .with_response(BaseResp::new(true, "200", "ok")),
            RetryPolicy::new(5, BACKOFF),
            true,
        )
        .await;

        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(sent_tokens(&transport), ["token-1", "token-1"]);
        assert_eq!(transport.handshake_count(), 2);
        assert_eq!(dispatcher.session.token().await, "token-1");
    }

    #[tokio::test]
    async fn test_successful_202_is_terminal() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_response(BaseResp::new(true, "202", "accepted"))
                .with_response(BaseResp::new(true, "200", "never")),
            5,
        )
        .await;

        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.code, "202");
        assert_eq!(transport.handshake_count(), 1);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempt_policy_still_sends_once() {
        let (dispatcher, transport, _) = setup_with(
            MockTransport::new().with_response(BaseResp::new(true, "200", "ok")),
            RetryPolicy::new(0, BACKOFF),
            false,
        )
        .await;

        assert_eq!(dispatcher.policy().max_attempts(), 1);
        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_failure_retries_without_handshake_or_wait() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_response(BaseResp::new(false, "500", "internal"))
                .with_response(BaseResp::new(true, "200", "ok")),
            5,
        )
        .await;

        let start = tokio::time::Instant::now();
        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert_eq!(resp.code, "200");
        assert_eq!(transport.handshake_count(), 1);
        assert_eq!(transport.call_count(), 2);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_other_failure_codes_are_terminal() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new().with_response(BaseResp::new(false, "404", "no result")),
            5,
        )
        .await;

        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert!(!resp.success);
        assert_eq!(resp.code, "404");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_2xx_status_aborts() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_reply(Ok(HttpReply::new(503, "unavailable")))
                .with_response(BaseResp::new(true, "200", "never")),
            5,
        )
        .await;

        let err = dispatcher.dispatch(request()).await.unwrap_err();
        assert!(matches!(
            err,
            RestClientError::NonSuccessStatus { status: 503, .. }
        ));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_in_band_retries_exhaust() {
        let (dispatcher, transport, _) = setup(
            MockTransport::new()
                .with_response(BaseResp::new(false, "500", ""))
                .with_response(BaseResp::new(false, "502", ""))
                .with_response(BaseResp::new(false, "202", "")),
            3,
        )
        .await;

        let err = dispatcher.dispatch(request()).await.unwrap_err();
        assert!(matches!(
            err,
            RestClientError::RetryExhausted { attempts: 3, .. }
        ));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_terminal_failure() {
        let (dispatcher, _, _) = setup(
            MockTransport::new().with_reply(Ok(HttpReply::ok("not json"))),
            5,
        )
        .await;

        let resp = dispatcher.dispatch(request()).await.unwrap();
        assert_eq!(resp, BaseResp::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_backoff() {
        let (dispatcher, transport, cancel) =
            setup(MockTransport::new().with_transport_failures(5), 5).await;

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let err = dispatcher.dispatch(request()).await.unwrap_err();
        assert!(matches!(err, RestClientError::Cancelled));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let (dispatcher, transport, cancel) = setup(MockTransport::new(), 5).await;
        cancel.cancel();

        assert!(matches!(
            dispatcher.dispatch(request()).await,
            Err(RestClientError::Cancelled)
        ));
        assert_eq!(transport.call_count(), 0);
    }
}
