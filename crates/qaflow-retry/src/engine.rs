use std::future::Future;
use std::time::Duration;

use qaflow_core::{backoff_delay_ms, CancellationToken};

use qaflow_classifier::classify;

use crate::policy::RetryPolicy;
use crate::result::{AttemptFailure, OpFailure, RetryResult};

/// Runs `op` under `policy`, retrying the whole operation (not a single
/// step) from attempt 1 on classified, retryable failures, with
/// truncated exponential backoff. `label` is used only for tracing.
///
/// `op` is invoked with the 1-indexed attempt number and must return
/// `Ok(value)` on success or `Err(OpFailure)` describing what went
/// wrong, so the engine can classify it itself (§4.D).
pub async fn run<T, F, Fut>(
    mut op: F,
    policy: &RetryPolicy,
    label: &str,
    token: &CancellationToken,
) -> RetryResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, OpFailure>>,
{
    let mut attempt = 1;
    let mut failure_history = Vec::new();

    loop {
        if token.is_cancelled() {
            return RetryResult {
                success: false,
                value: None,
                attempts: attempt.saturating_sub(1).max(0),
                cancelled: true,
                failure_history,
            };
        }

        match op(attempt).await {
            Ok(value) => {
                return RetryResult {
                    success: true,
                    value: Some(value),
                    attempts: attempt,
                    cancelled: false,
                    failure_history,
                }
            }
            Err(failure) => {
                let classification =
                    classify(&failure.exception_kind, &failure.message, failure.phase, attempt);
                tracing::warn!(
                    label,
                    attempt,
                    category = ?classification.category,
                    retryable = classification.retryable,
                    "retry engine observed a failed attempt"
                );
                failure_history.push(AttemptFailure {
                    attempt,
                    category: classification.category,
                    message: failure.message,
                });

                let should_retry = policy.enabled
                    && classification.retryable
                    && policy.retry_on.contains(&classification.category)
                    && attempt < policy.max_attempts;

                if !should_retry {
                    return RetryResult {
                        success: false,
                        value: None,
                        attempts: attempt,
                        cancelled: false,
                        failure_history,
                    };
                }

                let delay_ms =
                    backoff_delay_ms(policy.base_delay_ms, policy.multiplier, policy.max_delay_ms, attempt);
                let completed = token.sleep_or_cancelled(Duration::from_millis(delay_ms)).await;
                if !completed {
                    // Backoff for the next attempt was already entered, so that
                    // retry counts as committed even though it never executed.
                    return RetryResult {
                        success: false,
                        value: None,
                        attempts: attempt + 1,
                        cancelled: true,
                        failure_history,
                    };
                }
                attempt += 1;
            }
        }
    }
}
