//! Bounded retry with exponential backoff for provider requests

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use tracing::{debug, warn};

use super::LlmError;

/// Delay before the first retry
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Longest single wait, including provider `retry-after` hints
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Delay before retry number `attempt` (1-based)
pub(crate) fn backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    Duration::from_millis(INITIAL_BACKOFF_MS.saturating_mul(1u64 << exponent)).min(MAX_BACKOFF)
}

/// Delay before retrying after `error`, never shorter than the backoff
fn delay_for(error: &LlmError, attempt: u32) -> Duration {
    let base = backoff(attempt);
    error
        .retry_after()
        .map_or(base, |hint| hint.max(base).min(MAX_BACKOFF))
}

fn retry_after_header(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Send the request `build` produces, retrying transient failures
///
/// Makes at most `max_retries + 1` attempts. The first non-retryable error,
/// or the last error once retries run out, is returned as is.
pub(crate) async fn send_with_retry<F>(max_retries: u32, timeout: Duration, mut build: F) -> Result<Response, LlmError>
where
    F: FnMut() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        let error = match build().send().await {
            Ok(response) if response.status().is_success() => {
                debug!(attempt, "send_with_retry: success");
                return Ok(response);
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let retry_after = retry_after_header(&response);
                let body = response.text().await.unwrap_or_default();
                LlmError::from_status(status, retry_after, body)
            }
            Err(e) => LlmError::from_transport(e, timeout),
        };

        if !error.is_retryable() || attempt >= max_retries {
            debug!(attempt, error = %error, "send_with_retry: giving up");
            return Err(error);
        }

        attempt += 1;
        let delay = delay_for(&error, attempt);
        warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Retrying LLM request after transient error"
        );
        tokio::time::sleep(delay).await;
    }
}
