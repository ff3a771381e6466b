use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qaflow_contract::{BrowserKind, RunStatus, Step};
use qaflow_core::QaError;
use qaflow_driver::{BrowserDriver, DriverTimeouts, Session, StepOutcome};
use qaflow_history::{run_history_consumer, HistoryStore};
use qaflow_orchestrator::{Orchestrator, QaConfig, RunOptions};

/// Fails every other run so the resulting history shows up as flaky
/// rather than stable or consistently broken.
struct AlternatingDriver {
    calls: AtomicUsize,
}

struct AlternatingSession {
    fail_this_run: bool,
}

#[async_trait]
impl BrowserDriver for AlternatingDriver {
    async fn open(&self, _browser_kind: BrowserKind, _headless: bool, _timeouts: DriverTimeouts) -> Result<Box<dyn Session>, QaError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(AlternatingSession {
            fail_this_run: call % 2 == 1,
        }))
    }
}

#[async_trait]
impl Session for AlternatingSession {
    async fn execute(&mut self, _step: &Step) -> StepOutcome {
        if self.fail_this_run {
            StepOutcome::failure("AssertionError", "expected 'Welcome' got 'Login'")
        } else {
            StepOutcome::ok()
        }
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, QaError> {
        Ok(Vec::new())
    }

    async fn close(&mut self) -> Result<(), QaError> {
        Ok(())
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
async fn integration_alternating_failures_surface_as_flaky_in_the_analyzer() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(AlternatingDriver { calls: AtomicUsize::new(0) });
    let (history_tx, history_rx) = tokio::sync::mpsc::channel(32);
    let orchestrator = Orchestrator::new(QaConfig::default(), driver, Some(history_tx));

    let store = Arc::new(HistoryStore::new());
    // The orchestrator's worker pool holds its own clone of the sender
    // for the lifetime of the process, so the channel never closes on
    // its own; the consumer task is left running and dropped with the
    // runtime at the end of the test instead of being awaited to completion.
    let _consumer = tokio::spawn(run_history_consumer(history_rx, store.clone()));

    let test_id = orchestrator
        .create_test("login flow", "playwright", vec![step("ASSERT_TEXT")], 0, serde_json::Value::Null)
        .expect("create_test");

    const RUNS: usize = 8;
    let mut run_ids = Vec::with_capacity(RUNS);
    for _ in 0..RUNS {
        run_ids.push(
            orchestrator
                .submit(&test_id, RunOptions::default())
                .expect("submit"),
        );
    }

    for run_id in &run_ids {
        loop {
            let run = orchestrator.get(run_id).expect("run exists");
            if run.status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    let history = loop {
        let history = store.history();
        if history.len() == RUNS {
            break history;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };
    assert_eq!(history.len(), RUNS);
    let passed = history.iter().filter(|row| row.status == RunStatus::Passed).count();
    assert_eq!(passed, RUNS / 2);

    let flaky = qaflow_flaky::flaky(&history);
    assert_eq!(flaky.len(), 1);
    assert_eq!(flaky[0].test_name, "login flow");
    assert!((flaky[0].pass_rate - 50.0).abs() < 1e-9);

    let health = qaflow_flaky::suite_health(&history);
    assert_eq!(health.flaky_tests, 1);
}
