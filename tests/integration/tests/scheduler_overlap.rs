use std::sync::Arc;
use std::time::Duration;

use qaflow_contract::Step;
use qaflow_core::QaError;
use qaflow_driver::{BrowserDriver, NullDriver};
use qaflow_orchestrator::{Orchestrator, QaConfig};
use qaflow_scheduler::{ScheduleRegistry, SchedulerConfig, SchedulerRuntime};

fn step(action: &str) -> Step {
    Step {
        action: action.to_string(),
        locator: None,
        value: None,
        timeout_ms: None,
    }
}

#[tokio::test]
async fn integration_trigger_now_rejects_overlap_while_a_run_is_in_flight() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(NullDriver);
    let orchestrator = Orchestrator::new(QaConfig::default(), driver, None);
    let test_id = orchestrator
        .create_test("nightly smoke", "playwright", vec![step("NAVIGATE")], 0, serde_json::Value::Null)
        .expect("create_test");

    let registry = Arc::new(ScheduleRegistry::new());
    let schedule_id = registry.create(&test_id, "0 * * * * *", "UTC").expect("create schedule");
    let runtime = SchedulerRuntime::new(orchestrator, registry.clone(), SchedulerConfig::default());

    let _first_run_id = runtime.trigger_now(&schedule_id).expect("first trigger succeeds");

    let second = runtime.trigger_now(&schedule_id);
    assert!(matches!(second, Err(QaError::Conflict { .. })));

    for _ in 0..200 {
        if !registry.get(&schedule_id).expect("schedule exists").running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let entry = registry.get(&schedule_id).expect("schedule exists");
    assert!(!entry.running);
    assert_eq!(entry.total_runs, 1);

    // Once the in-flight run settles, a fresh trigger is accepted again.
    let third = runtime.trigger_now(&schedule_id);
    assert!(third.is_ok());
}

#[tokio::test]
async fn integration_tick_drops_overlapped_fire_instead_of_submitting_a_second_run() {
    let driver: Arc<dyn BrowserDriver> = Arc::new(NullDriver);
    let orchestrator = Orchestrator::new(QaConfig::default(), driver, None);
    let test_id = orchestrator
        .create_test("nightly smoke", "playwright", vec![step("NAVIGATE")], 0, serde_json::Value::Null)
        .expect("create_test");

    let registry = Arc::new(ScheduleRegistry::new());
    let schedule_id = registry.create(&test_id, "0 * * * * *", "UTC").expect("create schedule");

    // Simulate a run already in flight whose fire instant has since elapsed.
    registry.mark_running(&schedule_id).expect("mark_running");
    let now = qaflow_core::current_unix_timestamp_ms();
    registry.apply_advance(
        &schedule_id,
        qaflow_scheduler::ScheduleAdvance {
            next_run_ts_ms: now.saturating_sub(1),
            missed: 0,
        },
    );

    let runtime = SchedulerRuntime::new(orchestrator, registry.clone(), SchedulerConfig::default());
    runtime.tick();

    let entry = registry.get(&schedule_id).expect("schedule exists");
    assert!(entry.running, "tick must not touch the in-flight run's running flag");
    assert_eq!(entry.total_runs, 0, "overlapped fire must not be submitted as a run");
    assert_eq!(entry.missed_fires, 1);
    assert!(entry.next_run_ts_ms.expect("next run scheduled") > now);
}
