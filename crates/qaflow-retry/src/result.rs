use qaflow_contract::FailureCategory;
use qaflow_classifier::Phase;

/// What a retried operation reports on failure; the engine classifies it
/// itself rather than trusting a caller-supplied category (§4.D, §4.C).
#[derive(Debug, Clone)]
pub struct OpFailure {
    pub exception_kind: String,
    pub message: String,
    pub phase: Phase,
}

impl OpFailure {
    pub fn new(exception_kind: impl Into<String>, message: impl Into<String>, phase: Phase) -> Self {
        Self {
            exception_kind: exception_kind.into(),
            message: message.into(),
            phase,
        }
    }
}

/// One classified failed attempt, recorded for the run's `failure_history`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub attempt: u32,
    pub category: FailureCategory,
    pub message: String,
}

/// Outcome of `run` (§4.D). `cancelled` and `success` are mutually
/// exclusive; a cancelled retry never carries a value.
#[derive(Debug, Clone)]
pub struct RetryResult<T> {
    pub success: bool,
    pub value: Option<T>,
    pub attempts: u32,
    pub cancelled: bool,
    pub failure_history: Vec<AttemptFailure>,
}
