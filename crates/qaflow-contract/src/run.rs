use serde::{Deserialize, Serialize};

/// Run lifecycle status (§3, §4.E). Terminal statuses are write-once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Queued,
    Running,
    Passed,
    Failed,
    Error,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Passed | Self::Failed | Self::Error | Self::Cancelled
        )
    }

    /// Returns whether `self -> next` is a legal edge in the §4.E state
    /// diagram. Used to guard every mutation of a `Run`'s status so a
    /// terminal state can never be silently overwritten.
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        use RunStatus::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (Queued, Running) | (Queued, Cancelled) => true,
            (Running, Passed) | (Running, Failed) | (Running, Error) | (Running, Cancelled) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
    Chromium,
    Webkit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggeredBy {
    Api,
    Schedule,
    Agent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCategory {
    Timeout,
    ElementNotFound,
    StaleElement,
    ElementNotInteractable,
    InvalidSelector,
    NetworkError,
    AssertionFailed,
    ApplicationError,
    Configuration,
    Unknown,
}

impl FailureCategory {
    /// Static retryability table from §4.C: TIMEOUT, NETWORK_ERROR,
    /// STALE_ELEMENT, and ELEMENT_NOT_FOUND are retryable; everything
    /// else (including UNKNOWN) is not.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::NetworkError | Self::StaleElement | Self::ElementNotFound
        )
    }
}

/// An execution of a `TestDefinition` (§3 "Run").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Run {
    pub id: String,
    pub test_id: String,
    pub status: RunStatus,
    pub browser: BrowserKind,
    pub environment: String,
    pub start_ts_ms: Option<u64>,
    pub end_ts_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub retry_count: u32,
    pub failure_category: Option<FailureCategory>,
    pub error_summary: Option<String>,
    pub artifact_refs: Vec<String>,
    pub log_ref: Option<String>,
    pub triggered_by: TriggeredBy,
    pub schedule_id: Option<String>,
}

impl Run {
    pub fn new(id: String, test_id: String, browser: BrowserKind, environment: String, triggered_by: TriggeredBy, schedule_id: Option<String>) -> Self {
        Self {
            id,
            test_id,
            status: RunStatus::Queued,
            browser,
            environment,
            start_ts_ms: None,
            end_ts_ms: None,
            duration_ms: None,
            retry_count: 0,
            failure_category: None,
            error_summary: None,
            artifact_refs: Vec::new(),
            log_ref: None,
            triggered_by,
            schedule_id,
        }
    }
}
