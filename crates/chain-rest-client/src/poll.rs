//! Polling for results that are not available yet.

use std::future::Future;

use chain_rest_types::BaseResp;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{RestClientError, Result};

/// Run `query` until it answers with something other than a pending code.
///
/// Pending means `success=false` with code 404, 413 or 414. Polls back to
/// back without waiting. After `max_attempts` pending answers the last one is
/// returned; errors from `query` end polling at once.
pub async fn poll_until_settled<F, Fut>(
    max_attempts: u32,
    cancel: &CancellationToken,
    mut query: F,
) -> Result<BaseResp>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<BaseResp>>,
{
    let mut last = BaseResp::default();
    for attempt in 1..=max_attempts.max(1) {
        if cancel.is_cancelled() {
            return Err(RestClientError::Cancelled);
        }
        last = query().await?;
        if !last.is_pending() {
            return Ok(last);
        }
        debug!(attempt, code = %last.code, "Result not ready, polling again");
    }
    Ok(last)
}
