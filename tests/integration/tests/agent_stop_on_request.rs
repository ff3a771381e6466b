use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qaflow_agent::{AgentConfig, FixAgent, HistorySource, WaitInjectionProposer};
use qaflow_contract::{AgentStatus, BrowserKind, RunHistory, RunStatus, Step};
use qaflow_core::{CancellationToken, QaError};
use qaflow_driver::{BrowserDriver, DriverTimeouts, Session, StepOutcome};
use qaflow_orchestrator::{Orchestrator, QaConfig};

/// Sleeps before completing each step, leaving a window in which the
/// test can request the agent to stop mid-verification.
struct SlowDriver {
    step_delay: Duration,
}

struct SlowSession {
    step_delay: Duration,
}

#[async_trait]
impl BrowserDriver for SlowDriver {
    async fn open(&self, _browser_kind: BrowserKind, _headless: bool, _timeouts: DriverTimeouts) -> Result<Box<dyn Session>, QaError> {
        Ok(Box::new(SlowSession { step_delay: self.step_delay }))
    }
}

#[async_trait]
impl Session for SlowSession {
    async fn execute(&mut self, _step: &Step) -> StepOutcome {
        tokio::time::sleep(self.step_delay).await;
        StepOutcome::ok()
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, QaError> {
        Ok(Vec::new())
    }

    async fn close(&mut self) -> Result<(), QaError> {
        Ok(())
    }
}

struct AlwaysFlaky;
impl HistorySource for AlwaysFlaky {
    fn recent_history(&self, test_name: &str) -> Vec<RunHistory> {
        vec![
            row(test_name, RunStatus::Passed),
            row(test_name, RunStatus::Failed),
            row(test_name, RunStatus::Passed),
            row(test_name, RunStatus::Failed),
        ]
    }
}

fn row(test_name: &str, status: RunStatus) -> RunHistory {
    RunHistory {
        run_id: "r".to_string(),
        test_name: test_name.to_string(),
        status,
        duration_ms: 10,
        failure_type: None,
        browser: BrowserKind::Chrome,
        environment: "staging".to_string(),
        executed_at_unix_ms: 1,
    }
}

fn step(action: &str) -> Step {
    Step {
        action: action.to_string(),
        locator: None,
        value: None,
        timeout_ms: None,
    }
}

#[tokio::test]
async fn integration_agent_stop_mid_verification_cancels_the_in_flight_run() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(SlowDriver {
        step_delay: Duration::from_millis(200),
    });
    let orchestrator = Orchestrator::new(QaConfig::default(), driver, None);
    let test_id = orchestrator
        .create_test("flaky checkout", "playwright", vec![step("NAVIGATE")], 0, serde_json::Value::Null)
        .expect("create_test");

    let agent = FixAgent::new(
        orchestrator.clone(),
        Box::new(AlwaysFlaky),
        Box::new(WaitInjectionProposer::default()),
        AgentConfig::default(),
    );

    let stop = CancellationToken::new();
    let stop_watcher = stop.clone();
    let handle = tokio::spawn(async move { agent.run(&test_id, "flaky checkout", stop).await });

    tokio::time::sleep(Duration::from_millis(30)).await;
    stop_watcher.cancel();

    let execution = handle.await.expect("agent task");
    assert_eq!(execution.status, AgentStatus::Stopped);
    assert!(execution
        .action_log
        .iter()
        .any(|action| action.kind == "verify" && action.output.as_deref() == Some("Stopped")));
}
