use qaflow_contract::{BrowserKind, TestDefinition, TriggeredBy};
use qaflow_retry::RetryPolicy;

/// Per-submission options (§6 "submit run"). `retry_override` replaces
/// the orchestrator's default `RetryPolicy` for this run only.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub browser: BrowserKind,
    pub headless: bool,
    pub environment: String,
    pub retry_override: Option<RetryPolicy>,
    pub triggered_by: TriggeredBy,
    pub schedule_id: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chrome,
            headless: true,
            environment: "default".to_string(),
            retry_override: None,
            triggered_by: TriggeredBy::Api,
            schedule_id: None,
        }
    }
}

/// One unit of work dequeued by a worker.
#[derive(Debug, Clone)]
pub struct Job {
    pub run_id: String,
    pub test: TestDefinition,
    pub opts: RunOptions,
}
