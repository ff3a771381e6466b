use thiserror::Error;

use crate::time_utils::current_unix_timestamp_ms;

/// Error kinds surfaced by the core, per the error handling design.
///
/// `Internal` is the only variant the rest of the system treats as a bug
/// rather than an expected control-flow outcome; it carries a stable
/// correlation id so a user-visible failure can be tied back to a log line.
#[derive(Debug, Error)]
pub enum QaError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("backpressure: {message}")]
    Backpressure { message: String },

    #[error("transient infrastructure error: {message}")]
    TransientInfra { message: String },

    #[error("internal error [{correlation_id}]: {message}")]
    Internal {
        message: String,
        correlation_id: String,
    },
}

impl QaError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn backpressure(message: impl Into<String>) -> Self {
        Self::Backpressure {
            message: message.into(),
        }
    }

    pub fn transient_infra(message: impl Into<String>) -> Self {
        Self::TransientInfra {
            message: message.into(),
        }
    }

    /// Builds an `Internal` error, stamping a correlation id derived from
    /// the current timestamp and a random suffix so repeated internal
    /// failures in a log stream can be told apart.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            correlation_id: format!(
                "corr-{}-{}",
                current_unix_timestamp_ms(),
                uuid::Uuid::new_v4()
                    .simple()
                    .to_string()
                    .chars()
                    .take(8)
                    .collect::<String>()
            ),
        }
    }

    /// Returns true when the Retry Engine is allowed to consider retrying
    /// an operation that failed with this error kind.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientInfra { .. })
    }
}

pub type QaResult<T> = Result<T, QaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_internal_error_carries_stable_correlation_id_prefix() {
        let error = QaError::internal("driver crashed");
        match error {
            QaError::Internal { correlation_id, .. } => {
                assert!(correlation_id.starts_with("corr-"));
            }
            _ => panic!("expected Internal variant"),
        }
    }

    #[test]
    fn unit_is_retryable_only_true_for_transient_infra() {
        assert!(QaError::transient_infra("flaky network").is_retryable());
        assert!(!QaError::validation("bad script").is_retryable());
        assert!(!QaError::conflict("already terminal").is_retryable());
    }
}
