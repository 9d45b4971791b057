//! Retry with exponential back-off and jitter for the `YouTube` client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Quota and authorization
//! failures are returned immediately: they are only recoverable by switching
//! keys, which is the caller's job.

use std::future::Future;
use std::time::Duration;

use crate::error::YoutubeError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** [`YoutubeError::QuotaExceeded`], any other status,
/// malformed bodies, and configuration errors.
pub(crate) fn is_retriable(err: &YoutubeError) -> bool {
    match err {
        YoutubeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        YoutubeError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        YoutubeError::QuotaExceeded { .. }
        | YoutubeError::Deserialize { .. }
        | YoutubeError::InvalidBaseUrl { .. } => false,
    }
}

/// Sleep before retry number `attempt` (1-based): `base × 2^(attempt-1)`,
/// capped at 60 s, then scaled by a random factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, YoutubeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, YoutubeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "YouTube transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    fn status(code: u16) -> YoutubeError {
        YoutubeError::UnexpectedStatus {
            status: code,
            url: "/youtube/v3/videos".to_owned(),
        }
    }

    fn quota() -> YoutubeError {
        YoutubeError::QuotaExceeded {
            status: 403,
            reason: "quotaExceeded".to_owned(),
        }
    }

    #[test]
    fn quota_exceeded_is_not_retriable() {
        assert!(!is_retriable(&quota()));
    }

    #[test]
    fn server_errors_and_throttling_are_retriable() {
        assert!(is_retriable(&status(500)));
        assert!(is_retriable(&status(503)));
        assert!(is_retriable(&status(429)));
        assert!(!is_retriable(&status(404)));
        assert!(!is_retriable(&status(400)));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        let source = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&YoutubeError::Deserialize {
            context: "test".to_owned(),
            source,
        }));
    }

    #[test]
    fn backoff_delay_doubles_within_jitter_and_caps() {
        for _ in 0..50 {
            let first = backoff_delay_ms(1_000, 1);
            assert!((750..1_250).contains(&first), "got {first}");
            let third = backoff_delay_ms(1_000, 3);
            assert!((3_000..5_000).contains(&third), "got {third}");
            let huge = backoff_delay_ms(1_000, 30);
            assert!(huge < 75_000, "got {huge}");
        }
    }

    /// Drives the retry loop with one scripted outcome per attempt and
    /// reports how many attempts were made.
    async fn run_script(
        max_retries: u32,
        script: Vec<Result<u32, YoutubeError>>,
    ) -> (Result<u32, YoutubeError>, usize) {
        let script = Mutex::new(script.into_iter());
        let attempts = AtomicUsize::new(0);
        let result = retry_with_backoff(max_retries, 0, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            let next = script.lock().unwrap().next().expect("script exhausted");
            async move { next }
        })
        .await;
        (result, attempts.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_is_returned_without_retry() {
        let (result, attempts) = run_script(3, vec![Ok(42)]).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn quota_rejection_is_returned_on_first_attempt() {
        let (result, attempts) = run_script(3, vec![Err(quota())]).await;
        assert_eq!(attempts, 1);
        assert!(matches!(result, Err(YoutubeError::QuotaExceeded { .. })));
    }

    #[tokio::test]
    async fn transient_failures_then_success() {
        let (result, attempts) =
            run_script(3, vec![Err(status(503)), Err(status(429)), Ok(99)]).await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn last_error_is_returned_once_retries_run_out() {
        let script = vec![Err(status(502)), Err(status(503)), Err(status(500))];
        let (result, attempts) = run_script(2, script).await;
        assert_eq!(attempts, 3);
        assert!(matches!(
            result,
            Err(YoutubeError::UnexpectedStatus { status: 500, .. })
        ));
    }
}
