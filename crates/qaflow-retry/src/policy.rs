use std::collections::HashSet;

use qaflow_contract::FailureCategory;

/// Retry policy (§4.D, §6 "retry.*" config). `retry_on` is the set of
/// failure categories the engine is allowed to retry even when the
/// Classifier marks them retryable — a caller can narrow coverage
/// further than the Classifier's blanket retryability table.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub retry_on: HashSet<FailureCategory>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
            multiplier: 2.0,
            retry_on: [
                FailureCategory::Timeout,
                FailureCategory::NetworkError,
                FailureCategory::StaleElement,
                FailureCategory::ElementNotFound,
            ]
            .into_iter()
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_default_retry_policy_retries_only_transient_categories() {
        let policy = RetryPolicy::default();
        assert!(policy.retry_on.contains(&FailureCategory::Timeout));
        assert!(!policy.retry_on.contains(&FailureCategory::AssertionFailed));
    }
}
