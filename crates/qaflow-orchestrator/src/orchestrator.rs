use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use qaflow_artifacts::ArtifactStore;
use qaflow_contract::{Run, RunStatus, Step, TerminalRunEvent, TestDefinition};
use qaflow_core::{current_unix_timestamp_ms, generate_id, CancellationToken, QaError};
use qaflow_driver::BrowserDriver;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::config::QaConfig;
use crate::job::{Job, RunOptions};
use crate::registry::TestRegistry;
use crate::run_executor::execute_run;
use crate::view::{filter_and_page, ListFilter, Paging, RunView};

struct OrchestratorInner {
    config: QaConfig,
    driver: Arc<dyn BrowserDriver>,
    artifacts: Arc<ArtifactStore>,
    test_registry: TestRegistry,
    runs: Mutex<HashMap<String, Run>>,
    tokens: Mutex<HashMap<String, CancellationToken>>,
    job_tx: mpsc::Sender<Job>,
    history_tx: Option<mpsc::Sender<TerminalRunEvent>>,
}

/// The Execution Orchestrator (§4.E): a bounded job queue, a fixed-size
/// worker pool, a run registry, and the public intake API (§6). Cloning
/// an `Orchestrator` shares the same inner state and worker pool; it is
/// the unit other crates (scheduler, agent, cli) hold onto.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

impl Orchestrator {
    /// Builds the orchestrator and spawns its worker pool. `history_tx`
    /// is the optional feed into the History Recorder (§4.G); omit it in
    /// tests that don't care about history.
    pub fn new(
        config: QaConfig,
        driver: Arc<dyn BrowserDriver>,
        history_tx: Option<mpsc::Sender<TerminalRunEvent>>,
    ) -> Self {
        let artifacts = Arc::new(ArtifactStore::new(config.artifact.clone()));
        let (job_tx, job_rx) = mpsc::channel(config.queue.capacity);
        let worker_count = config.workers.count.max(1);

        let inner = Arc::new(OrchestratorInner {
            config,
            driver,
            artifacts,
            test_registry: TestRegistry::new(),
            runs: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            job_tx,
            history_tx,
        });

        let shared_rx = Arc::new(AsyncMutex::new(job_rx));
        for _ in 0..worker_count {
            let inner = inner.clone();
            let shared_rx = shared_rx.clone();
            let _handle: JoinHandle<()> = tokio::spawn(async move {
                worker_loop(inner, shared_rx).await;
            });
        }

        Self { inner }
    }

    pub fn create_test(
        &self,
        name: &str,
        framework: &str,
        script: Vec<Step>,
        priority: i32,
        notification_preferences: serde_json::Value,
    ) -> Result<String, QaError> {
        self.inner
            .test_registry
            .create_test(name, framework, script, priority, notification_preferences)
    }

    pub fn set_test_active(&self, test_id: &str, active: bool) -> Result<(), QaError> {
        self.inner.test_registry.set_active(test_id, active)
    }

    pub fn get_test(&self, test_id: &str) -> Option<TestDefinition> {
        self.inner.test_registry.get(test_id)
    }

    /// Write-through used by the Fix Agent to apply (and, on a failed
    /// verification pass, revert) a proposed script change (§4.I).
    pub fn update_test_script(&self, test_id: &str, script: Vec<Step>) -> Result<(), QaError> {
        self.inner.test_registry.update_script(test_id, script)
    }

    /// Enqueues a run (§6 "submit run"). Rejects an unknown or inactive
    /// test with `NOT_FOUND`/`VALIDATION`, and a full queue with
    /// `BACKPRESSURE` — in which case the run and its cancellation token
    /// are rolled back rather than left orphaned in the registry.
    pub fn submit(&self, test_id: &str, opts: RunOptions) -> Result<String, QaError> {
        let test = self
            .inner
            .test_registry
            .get(test_id)
            .ok_or_else(|| QaError::not_found(format!("test '{test_id}' not found")))?;
        if !test.active {
            return Err(QaError::validation(format!("test '{test_id}' is not active")));
        }

        let run_id = generate_id("run");
        let run = Run::new(
            run_id.clone(),
            test_id.to_string(),
            opts.browser,
            opts.environment.clone(),
            opts.triggered_by,
            opts.schedule_id.clone(),
        );
        self.inner.runs.lock().expect("runs mutex poisoned").insert(run_id.clone(), run);
        self.inner
            .tokens
            .lock()
            .expect("tokens mutex poisoned")
            .insert(run_id.clone(), CancellationToken::new());

        let job = Job {
            run_id: run_id.clone(),
            test,
            opts,
        };
        match self.inner.job_tx.try_send(job) {
            Ok(()) => Ok(run_id),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.inner.runs.lock().expect("runs mutex poisoned").remove(&run_id);
                self.inner.tokens.lock().expect("tokens mutex poisoned").remove(&run_id);
                Err(QaError::backpressure("run queue is full"))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QaError::internal("run queue is closed")),
        }
    }

    pub fn get(&self, run_id: &str) -> Result<RunView, QaError> {
        self.inner
            .runs
            .lock()
            .expect("runs mutex poisoned")
            .get(run_id)
            .cloned()
            .ok_or_else(|| QaError::not_found(format!("run '{run_id}' not found")))
    }

    pub fn list(&self, filter: ListFilter, paging: Paging) -> Vec<RunView> {
        let runs: Vec<Run> = self
            .inner
            .runs
            .lock()
            .expect("runs mutex poisoned")
            .values()
            .cloned()
            .collect();
        filter_and_page(runs, &filter, paging)
    }

    /// Requests cancellation (§6 "cancel run"). A queued run is marked
    /// cancelled immediately since no worker has picked it up yet; a
    /// running one is signalled cooperatively via its token and the
    /// worker loop drives it to `CANCELLED`. Rejects already-terminal
    /// runs with `CONFLICT`.
    pub fn cancel(&self, run_id: &str) -> Result<(), QaError> {
        let mut runs = self.inner.runs.lock().expect("runs mutex poisoned");
        let run = runs
            .get_mut(run_id)
            .ok_or_else(|| QaError::not_found(format!("run '{run_id}' not found")))?;
        if run.status.is_terminal() {
            return Err(QaError::conflict(format!("run '{run_id}' is already terminal")));
        }
        if run.status == RunStatus::Queued {
            run.status = RunStatus::Cancelled;
            run.end_ts_ms = Some(current_unix_timestamp_ms());
        }
        drop(runs);

        if let Some(token) = self.inner.tokens.lock().expect("tokens mutex poisoned").get(run_id) {
            token.cancel();
        }
        Ok(())
    }
}

async fn worker_loop(inner: Arc<OrchestratorInner>, shared_rx: Arc<AsyncMutex<mpsc::Receiver<Job>>>) {
    loop {
        let job = {
            let mut rx = shared_rx.lock().await;
            rx.recv().await
        };
        let Some(job) = job else {
            break;
        };
        run_one_job(&inner, job).await;
    }
}

async fn run_one_job(inner: &Arc<OrchestratorInner>, job: Job) {
    let token = {
        let tokens = inner.tokens.lock().expect("tokens mutex poisoned");
        match tokens.get(&job.run_id) {
            Some(token) => token.clone(),
            None => return,
        }
    };

    let started = {
        let mut runs = inner.runs.lock().expect("runs mutex poisoned");
        match runs.get_mut(&job.run_id) {
            Some(run) if run.status.can_transition_to(RunStatus::Running) => {
                run.status = RunStatus::Running;
                run.start_ts_ms = Some(current_unix_timestamp_ms());
                true
            }
            _ => false,
        }
    };
    if !started {
        return;
    }

    tracing::info!(run_id = %job.run_id, test_id = %job.test.id, "run started");

    let run_timeout = std::time::Duration::from_millis(inner.config.run.timeout_ms);
    let outcome = tokio::select! {
        outcome = execute_run(&job, inner.driver.clone(), inner.artifacts.clone(), &inner.config.retry, &token) => outcome,
        _ = tokio::time::sleep(run_timeout) => {
            token.cancel();
            tracing::warn!(run_id = %job.run_id, "run exceeded wall-clock timeout");
            crate::run_executor::RunOutcome {
                status: RunStatus::Error,
                retry_count: 0,
                failure_category: Some(qaflow_contract::FailureCategory::Timeout),
                error_summary: Some("run exceeded wall-clock timeout".to_string()),
                artifact_refs: Vec::new(),
                log_ref: None,
            }
        }
    };

    let finished = {
        let mut runs = inner.runs.lock().expect("runs mutex poisoned");
        let run = match runs.get_mut(&job.run_id) {
            Some(run) => run,
            None => return,
        };
        let now = current_unix_timestamp_ms();
        if run.status.can_transition_to(outcome.status) {
            run.status = outcome.status;
        }
        run.end_ts_ms = Some(now);
        run.duration_ms = run.start_ts_ms.map(|start| now.saturating_sub(start));
        run.retry_count = outcome.retry_count;
        run.failure_category = outcome.failure_category;
        run.error_summary = outcome.error_summary.clone();
        run.artifact_refs = outcome.artifact_refs.clone();
        run.log_ref = outcome.log_ref.clone();
        run.clone()
    };

    inner.tokens.lock().expect("tokens mutex poisoned").remove(&job.run_id);

    tracing::info!(run_id = %job.run_id, status = ?finished.status, "run finished");

    if let Some(history_tx) = &inner.history_tx {
        let event = TerminalRunEvent {
            run: finished,
            test_name: job.test.name.clone(),
        };
        let _ = history_tx.try_send(event);
    }
}
