//! Bounded retry with linear backoff for fallible async operations.

use std::{future::Future, time::Duration};

use tracing::warn;

/// Default number of attempts per operation.
pub const RETRY_ATTEMPTS: u32 = 3;

/// Default backoff base; the wait before attempt `n + 1` is `base * n`.
pub const RETRY_BACKOFF_SECS: u64 = 2;

/// Retry budget for one network operation.
///
/// Deliberately simple bounded linear backoff, no jitter: every submission
/// is a single human-triggered action and the user can always resend.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_ATTEMPTS,
            backoff: Duration::from_secs(RETRY_BACKOFF_SECS),
        }
    }
}

/// Run `request` up to `policy.max_attempts` times, sleeping
/// `backoff * attempt_number` between attempts (numbering starts at 1).
///
/// The final attempt's error is propagated as-is rather than wrapped in a
/// generic exhaustion error, so the call site keeps the diagnostic detail.
/// The waits are `tokio::time::sleep`, so sibling pipeline runs keep making
/// progress while one is backing off.
pub async fn run_with_retry<T, E, F, Fut>(
    operation: &'static str,
    policy: &RetryPolicy,
    mut request: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1u32;

    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts {
                    warn!(
                        operation,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %err,
                        "operation failed, retries exhausted"
                    );
                    return Err(err);
                }

                let wait = policy.backoff * attempt;
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    wait_secs = wait.as_secs(),
                    "operation failed, waiting before retry"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn failing_until<'a>(
        calls: &'a AtomicU32,
        succeed_on: u32,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<u32, String>> + 'a>> {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move {
                if n >= succeed_on {
                    Ok(n)
                } else {
                    Err(format!("attempt {n} failed"))
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try_without_waiting() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result =
            run_with_retry("op", &RetryPolicy::default(), failing_until(&calls, 1)).await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn fails_twice_then_succeeds_with_two_linear_waits() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result =
            run_with_retry("op", &RetryPolicy::default(), failing_until(&calls, 3)).await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s after attempt 1, 4s after attempt 2.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_propagate_the_last_error() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result =
            run_with_retry("op", &RetryPolicy::default(), failing_until(&calls, 10)).await;
        assert_eq!(result, Err("attempt 3 failed".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Exactly max_attempts - 1 waits; none after the final failure.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_policy_controls_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 1,
            backoff: Duration::from_secs(2),
        };
        let result = run_with_retry("op", &policy, failing_until(&calls, 2)).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
