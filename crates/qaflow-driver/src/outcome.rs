/// Result of executing a single step through a `Session` (§4.B).
///
/// Carries the raw exception kind and message so the Failure Classifier
/// (qaflow-classifier) can categorize it; the driver port itself never
/// classifies anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub success: bool,
    pub exception_kind: Option<String>,
    pub message: Option<String>,
}

impl StepOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            exception_kind: None,
            message: None,
        }
    }

    pub fn failure(exception_kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            exception_kind: Some(exception_kind.into()),
            message: Some(message.into()),
        }
    }
}
