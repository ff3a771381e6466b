use std::sync::Arc;
use std::time::Duration;

use qaflow_contract::{BrowserKind, FailureCategory, RunStatus, Step};
use qaflow_driver::{BrowserDriver, NullDriver, ScriptedDriver, StepOutcome};
use qaflow_orchestrator::{Orchestrator, QaConfig, RunOptions};
use qaflow_retry::RetryPolicy;

fn step(action: &str) -> Step {
    Step {
        action: action.to_string(),
        locator: None,
        value: None,
        timeout_ms: None,
    }
}

async fn await_terminal(orchestrator: &Orchestrator, run_id: &str) -> qaflow_contract::Run {
    for _ in 0..200 {
        let run = orchestrator.get(run_id).expect("run exists");
        if run.status.is_terminal() {
            return run;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run {run_id} did not reach a terminal status in time");
}

#[tokio::test]
async fn integration_straight_line_submit_runs_to_passed() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(NullDriver);
    let orchestrator = Orchestrator::new(QaConfig::default(), driver, None);
    let test_id = orchestrator
        .create_test("login flow", "playwright", vec![step("NAVIGATE"), step("ASSERT_TITLE")], 0, serde_json::Value::Null)
        .expect("create_test");

    let run_id = orchestrator
        .submit(
            &test_id,
            RunOptions {
                browser: BrowserKind::Chrome,
                ..RunOptions::default()
            },
        )
        .expect("submit");

    let run = await_terminal(&orchestrator, &run_id).await;
    assert_eq!(run.status, RunStatus::Passed);
    assert_eq!(run.retry_count, 0);
}

#[tokio::test]
async fn integration_transient_timeout_recovers_through_retry() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(ScriptedDriver::new(vec![
        StepOutcome::failure("TimeoutException", "wait exceeded 5000ms"),
        StepOutcome::ok(),
    ]));
    let mut config = QaConfig::default();
    config.retry = RetryPolicy {
        base_delay_ms: 1,
        max_delay_ms: 2,
        ..RetryPolicy::default()
    };
    let orchestrator = Orchestrator::new(config, driver, None);
    let test_id = orchestrator
        .create_test("checkout flow", "playwright", vec![step("NAVIGATE")], 0, serde_json::Value::Null)
        .expect("create_test");

    let run_id = orchestrator
        .submit(&test_id, RunOptions::default())
        .expect("submit");

    let run = await_terminal(&orchestrator, &run_id).await;
    assert_eq!(run.status, RunStatus::Passed);
    assert_eq!(run.retry_count, 1);
}

#[tokio::test]
async fn integration_assertion_failure_is_terminal_without_retry() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(ScriptedDriver::new(vec![StepOutcome::failure(
        "AssertionError",
        "expected 'Welcome' got 'Login'",
    )]));
    let orchestrator = Orchestrator::new(QaConfig::default(), driver, None);
    let test_id = orchestrator
        .create_test("signup flow", "playwright", vec![step("ASSERT_TEXT")], 0, serde_json::Value::Null)
        .expect("create_test");

    let run_id = orchestrator
        .submit(&test_id, RunOptions::default())
        .expect("submit");

    let run = await_terminal(&orchestrator, &run_id).await;
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.failure_category, Some(FailureCategory::AssertionFailed));
    assert_eq!(run.retry_count, 0);
}

#[tokio::test]
async fn integration_cancel_during_backoff_lands_on_cancelled() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(ScriptedDriver::new(vec![StepOutcome::failure(
        "TimeoutException",
        "wait exceeded 5000ms",
    )]));
    let mut config = QaConfig::default();
    config.retry = RetryPolicy {
        base_delay_ms: 200,
        max_delay_ms: 500,
        max_attempts: 5,
        ..RetryPolicy::default()
    };
    let orchestrator = Orchestrator::new(config, driver, None);
    let test_id = orchestrator
        .create_test("flaky nav", "playwright", vec![step("NAVIGATE")], 0, serde_json::Value::Null)
        .expect("create_test");

    let run_id = orchestrator
        .submit(&test_id, RunOptions::default())
        .expect("submit");

    // Let the first attempt fail and enter backoff before cancelling.
    tokio::time::sleep(Duration::from_millis(20)).await;
    orchestrator.cancel(&run_id).expect("cancel");

    let run = await_terminal(&orchestrator, &run_id).await;
    assert_eq!(run.status, RunStatus::Cancelled);
    assert_eq!(run.retry_count, 1);
}

#[tokio::test]
async fn integration_independent_runs_get_distinct_ids_and_reject_stale_cancel() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(NullDriver);
    let orchestrator = Orchestrator::new(QaConfig::default(), driver, None);
    let test_id = orchestrator
        .create_test("idempotent nav", "playwright", vec![step("NAVIGATE")], 0, serde_json::Value::Null)
        .expect("create_test");

    let first = orchestrator
        .submit(&test_id, RunOptions::default())
        .expect("submit");
    let second = orchestrator
        .submit(&test_id, RunOptions::default())
        .expect("submit");
    assert_ne!(first, second);

    await_terminal(&orchestrator, &first).await;
    await_terminal(&orchestrator, &second).await;

    let stale_cancel = orchestrator.cancel(&first);
    assert!(matches!(stale_cancel, Err(qaflow_core::QaError::Conflict { .. })));
}
