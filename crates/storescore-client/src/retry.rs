//! Retry with exponential back-off and jitter for idempotent reads.
//!
//! Mutations never go through here: a create or move that timed out may
//! still have been applied, and re-sending it would duplicate the submission.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** other 4xx responses, malformed bodies, bad base URLs
/// and pagination runaways.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::Api { status, .. } => *status == 429 || *status >= 500,
        ClientError::Deserialize { .. }
        | ClientError::InvalidBaseUrl { .. }
        | ClientError::PaginationLimit { .. } => false,
    }
}

/// Longest pause between two reads of the same list.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Pause before read attempt `retry` (1-based): the base doubles per retry,
/// stops growing at [`MAX_DELAY`] and is then scaled by a random factor in
/// `[0.75, 1.25)` so parallel list loads do not retry in lockstep.
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let ceiling = Duration::from_millis(base_ms.saturating_mul(1 << exponent)).min(MAX_DELAY);
    ceiling.mul_f64(rand::random::<f64>().mul_add(0.5, 0.75))
}

/// Calls `read` until it succeeds, fails permanently, or has been retried
/// `max_retries` times. Only [`is_retriable`] failures are retried.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut read: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match read().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry == max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retry += 1;
        let delay = backoff_delay(backoff_base_ms, retry);
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "read failed, trying again"
        );
        tokio::time::sleep(delay).await;
    }
}
