//! Scripted transport for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chain_rest_types::BaseResp;

use super::traits::*;

const SHAKE_HAND_SUFFIX: &str = "/shakeHand";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: serde_json::Value,
}

/// Mock transport for testing.
///
/// Handshakes are answered automatically with `token-1`, `token-2`, ...
/// Every other request takes the next scripted reply; once the script runs
/// out, requests fail with a connection error.
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    handshake_count: AtomicU32,
    handshake_success: AtomicBool,
    // Handshakes numbered above these limits fail or are rejected
    handshake_fail_after: AtomicU32,
    handshake_reject_after: AtomicU32,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            handshake_count: AtomicU32::new(0),
            handshake_success: AtomicBool::new(true),
            handshake_fail_after: AtomicU32::new(u32::MAX),
            handshake_reject_after: AtomicU32::new(u32::MAX),
        }
    }

    /// Queue a response envelope with HTTP 200.
    pub fn with_response(self, resp: BaseResp) -> Self {
        let body = serde_json::to_vec(&resp).unwrap_or_default();
        self.with_reply(Ok(HttpReply::ok(body)))
    }

    /// Queue a raw reply.
    pub fn with_reply(self, reply: Result<HttpReply, TransportError>) -> Self {
        self.push(reply);
        self
    }

    /// Queue `count` connection failures.
    pub fn with_transport_failures(self, count: usize) -> Self {
        for _ in 0..count {
            self.push(Err(TransportError::Connect("connection refused".to_string())));
        }
        self
    }

    /// Make every handshake fail at the transport level.
    pub fn with_failing_handshake(self) -> Self {
        self.with_handshake_failures_after(0)
    }

    /// Let the first `count` handshakes through, then fail the rest at the
    /// transport level.
    pub fn with_handshake_failures_after(self, count: u32) -> Self {
        self.handshake_fail_after.store(count, Ordering::SeqCst);
        self
    }

    /// Let the first `count` handshakes succeed, then answer the rest with
    /// `success=false` and code `400`.
    pub fn with_handshake_rejections_after(self, count: u32) -> Self {
        self.handshake_reject_after.store(count, Ordering::SeqCst);
        self
    }

    /// Set the `success` flag of handshake responses.
    pub fn with_handshake_success(self, success: bool) -> Self {
        self.handshake_success.store(success, Ordering::SeqCst);
        self
    }

    /// Queue a reply after construction.
    pub fn push(&self, reply: Result<HttpReply, TransportError>) {
        lock(&self.replies).push_back(reply);
    }

    /// Number of handshakes attempted, failed ones included.
    pub fn handshake_count(&self) -> u32 {
        self.handshake_count.load(Ordering::SeqCst)
    }

    /// Non-handshake requests seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of non-handshake requests seen so far.
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpReply, TransportError> {
        if url.ends_with(SHAKE_HAND_SUFFIX) {
            let n = self.handshake_count.fetch_add(1, Ordering::SeqCst) + 1;
            if n > self.handshake_fail_after.load(Ordering::SeqCst) {
                return Err(TransportError::Connect("connection refused".to_string()));
            }
            let success = self.handshake_success.load(Ordering::SeqCst)
                && n <= self.handshake_reject_after.load(Ordering::SeqCst);
            let code = if success { "200" } else { "400" };
            let resp = BaseResp::new(success, code, format!("token-{}", n));
            let body = serde_json::to_vec(&resp).unwrap_or_default();
            return Ok(HttpReply::ok(body));
        }

        let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        lock(&self.requests).push(RecordedRequest {
            url: url.to_string(),
            body,
        });

        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no scripted reply".to_string())))
    }
}
