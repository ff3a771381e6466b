use std::sync::Arc;

use qaflow_artifacts::{ArtifactKind, ArtifactStore};
use qaflow_classifier::Phase;
use qaflow_contract::{FailureCategory, RunStatus};
use qaflow_core::CancellationToken;
use qaflow_driver::{BrowserDriver, DriverTimeouts};
use qaflow_retry::{run as retry_run, OpFailure, RetryPolicy};
use tokio::sync::Mutex as AsyncMutex;

use crate::job::{Job, RunOptions};

/// Outcome of executing one submitted job to a terminal run status;
/// applied onto the stored `Run` by the worker loop (§4.E).
pub struct RunOutcome {
    pub status: RunStatus,
    pub retry_count: u32,
    pub failure_category: Option<FailureCategory>,
    pub error_summary: Option<String>,
    pub artifact_refs: Vec<String>,
    pub log_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepRunOutcome {
    Passed,
    Cancelled,
}

/// Executes one job's test script to a terminal status (§4.E "Step
/// execution", "Retry coupling", "Artifact capture", "Cancellation").
pub async fn execute_run(
    job: &Job,
    driver: Arc<dyn BrowserDriver>,
    artifacts: Arc<ArtifactStore>,
    default_policy: &RetryPolicy,
    token: &CancellationToken,
) -> RunOutcome {
    let policy = job.opts.retry_override.clone().unwrap_or_else(|| default_policy.clone());
    let log_lines: Arc<AsyncMutex<Vec<String>>> = Arc::new(AsyncMutex::new(Vec::new()));
    let artifact_refs: Arc<AsyncMutex<Vec<String>>> = Arc::new(AsyncMutex::new(Vec::new()));

    let session = match driver
        .open(job.opts.browser, job.opts.headless, DriverTimeouts::default())
        .await
    {
        Ok(session) => session,
        Err(error) => {
            tracing::warn!(run_id = %job.run_id, %error, "driver setup failed");
            let log_ref = flush_log(&artifacts, &job.run_id, &[format!("driver open failed: {error}")]).await;
            return RunOutcome {
                status: RunStatus::Error,
                retry_count: 0,
                failure_category: Some(FailureCategory::Configuration),
                error_summary: Some(error.to_string()),
                artifact_refs: Vec::new(),
                log_ref,
            };
        }
    };
    let session = Arc::new(AsyncMutex::new(session));

    let op = {
        let session = session.clone();
        let log_lines = log_lines.clone();
        let artifact_refs = artifact_refs.clone();
        let artifacts = artifacts.clone();
        let script = job.test.script.clone();
        let run_id = job.run_id.clone();
        let token = token.clone();
        move |attempt: u32| {
            let session = session.clone();
            let log_lines = log_lines.clone();
            let artifact_refs = artifact_refs.clone();
            let artifacts = artifacts.clone();
            let script = script.clone();
            let run_id = run_id.clone();
            let token = token.clone();
            async move {
                let mut session_guard = session.lock().await;
                for step in &script {
                    if token.is_cancelled() {
                        return Ok(StepRunOutcome::Cancelled);
                    }
                    let outcome = session_guard.execute(step).await;
                    log_lines.lock().await.push(format!(
                        "attempt={attempt} action={} success={}",
                        step.action, outcome.success
                    ));
                    if !outcome.success {
                        let phase = step
                            .parsed_action()
                            .map(|action| if action.is_assertion() { Phase::Assertion } else { Phase::Action })
                            .unwrap_or(Phase::Action);
                        let exception_kind = outcome
                            .exception_kind
                            .clone()
                            .unwrap_or_else(|| "UnknownException".to_string());
                        let message = outcome
                            .message
                            .clone()
                            .unwrap_or_else(|| "step failed without message".to_string());

                        if let Ok(screenshot) = session_guard.screenshot().await {
                            if let Ok(key) = artifacts.put(
                                &run_id,
                                ArtifactKind::Screenshot,
                                &screenshot,
                                &format!("attempt-{attempt}-failure.png"),
                            ) {
                                artifact_refs.lock().await.push(key);
                            }
                        }

                        return Err(OpFailure::new(exception_kind, message, phase));
                    }
                }
                Ok(StepRunOutcome::Passed)
            }
        }
    };

    let retry_result = retry_run(op, &policy, &job.run_id, token).await;

    let final_log_lines = {
        let guard = log_lines.lock().await;
        guard.clone()
    };
    let log_ref = flush_log(&artifacts, &job.run_id, &final_log_lines).await;
    let mut refs = {
        let guard = artifact_refs.lock().await;
        guard.clone()
    };

    let status = if retry_result.cancelled {
        RunStatus::Cancelled
    } else if retry_result.success {
        match retry_result.value {
            Some(StepRunOutcome::Cancelled) => RunStatus::Cancelled,
            _ => RunStatus::Passed,
        }
    } else {
        RunStatus::Failed
    };

    if matches!(status, RunStatus::Passed | RunStatus::Failed) {
        let mut session_guard = session.lock().await;
        if let Ok(screenshot) = session_guard.screenshot().await {
            if let Ok(key) = artifacts.put(&job.run_id, ArtifactKind::Screenshot, &screenshot, "final.png") {
                refs.push(key);
            }
        }
    }
    {
        let mut session_guard = session.lock().await;
        let _ = session_guard.close().await;
    }

    let (failure_category, error_summary) = if status == RunStatus::Failed {
        let last = retry_result.failure_history.last();
        (
            Some(last.map(|f| f.category).unwrap_or(FailureCategory::Unknown)),
            last.map(|f| f.message.clone()),
        )
    } else {
        (None, None)
    };

    RunOutcome {
        status,
        retry_count: retry_result.attempts.saturating_sub(1),
        failure_category,
        error_summary,
        artifact_refs: refs,
        log_ref,
    }
}

async fn flush_log(artifacts: &ArtifactStore, run_id: &str, lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let text = lines.join("\n");
    artifacts.put_log(run_id, "worker", &text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaflow_artifacts::ArtifactStoreConfig;
    use qaflow_contract::{BrowserKind, Step, TestDefinition, TriggeredBy};
    use qaflow_driver::{NullDriver, ScriptedDriver, StepOutcome};

    fn test_def(script: Vec<Step>) -> TestDefinition {
        TestDefinition {
            id: "t1".to_string(),
            name: "sample".to_string(),
            framework: "playwright".to_string(),
            script,
            active: true,
            priority: 0,
            notification_preferences: serde_json::Value::Null,
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

    fn job(test: TestDefinition) -> Job {
        Job {
            run_id: "run-1".to_string(),
            test,
            opts: RunOptions {
                browser: BrowserKind::Chrome,
                headless: true,
                environment: "staging".to_string(),
                retry_override: None,
                triggered_by: TriggeredBy::Api,
                schedule_id: None,
            },
        }
    }

    fn artifact_store(tempdir: &tempfile::TempDir) -> Arc<ArtifactStore> {
        Arc::new(ArtifactStore::new(ArtifactStoreConfig {
            root: tempdir.path().to_path_buf(),
            retention_days: 30,
            max_file_bytes: 10 * 1024 * 1024,
        }))
    }

    #[tokio::test]
    async fn functional_execute_run_passes_with_null_driver() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let driver: Arc<dyn BrowserDriver> = Arc::new(NullDriver);
        let artifacts = artifact_store(&tempdir);
        let job = job(test_def(vec![step("NAVIGATE"), step("ASSERT_TITLE")]));
        let outcome = execute_run(
            &job,
            driver,
            artifacts,
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(outcome.status, RunStatus::Passed);
        assert_eq!(outcome.retry_count, 0);
    }

    #[tokio::test]
    async fn functional_execute_run_recovers_from_transient_timeout() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let driver: Arc<dyn BrowserDriver> = Arc::new(ScriptedDriver::new(vec![
            StepOutcome::failure("TimeoutException", "wait exceeded 5000ms"),
            StepOutcome::ok(),
        ]));
        let artifacts = artifact_store(&tempdir);
        let job = job(test_def(vec![step("NAVIGATE")]));
        let policy = RetryPolicy {
            base_delay_ms: 1,
            max_delay_ms: 2,
            ..RetryPolicy::default()
        };
        let outcome = execute_run(&job, driver, artifacts, &policy, &CancellationToken::new()).await;
        assert_eq!(outcome.status, RunStatus::Passed);
        assert_eq!(outcome.retry_count, 1);
    }

    #[tokio::test]
    async fn regression_execute_run_assertion_failure_is_terminal_failed_without_retry() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let driver: Arc<dyn BrowserDriver> = Arc::new(ScriptedDriver::new(vec![StepOutcome::failure(
            "AssertionError",
            "expected 'Welcome' got 'Login'",
        )]));
        let artifacts = artifact_store(&tempdir);
        let job = job(test_def(vec![step("ASSERT_TEXT")]));
        let outcome = execute_run(
            &job,
            driver,
            artifacts,
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(outcome.status, RunStatus::Failed);
        assert_eq!(outcome.failure_category, Some(FailureCategory::AssertionFailed));
        assert_eq!(outcome.retry_count, 0);
        assert!(!outcome.artifact_refs.is_empty());
    }

    #[tokio::test]
    async fn integration_execute_run_reports_cancelled_when_token_cancelled_before_step() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let driver: Arc<dyn BrowserDriver> = Arc::new(NullDriver);
        let artifacts = artifact_store(&tempdir);
        let job = job(test_def(vec![step("NAVIGATE"), step("CLICK")]));
        let token = CancellationToken::new();
        token.cancel();
        let outcome = execute_run(&job, driver, artifacts, &RetryPolicy::default(), &token).await;
        assert_eq!(outcome.status, RunStatus::Cancelled);
    }
}
