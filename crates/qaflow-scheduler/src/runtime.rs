use std::sync::Arc;
use std::time::Duration;

use qaflow_contract::{ScheduleEntry, TriggeredBy};
use qaflow_core::{current_unix_timestamp_ms, CancellationToken, QaError};
use qaflow_orchestrator::{Orchestrator, RunOptions};

use crate::config::SchedulerConfig;
use crate::next_fire::advance;
use crate::registry::ScheduleRegistry;

/// Cron tick loop feeding the orchestrator (§4.F), grounded directly on
/// `EventSchedulerRuntime::run`/`poll_once`: each tick finds due entries,
/// marks them running, submits a job, recomputes the next fire time, and
/// hands off terminal-status observation to a short-lived watcher task so
/// the tick loop itself never blocks on a run finishing.
pub struct SchedulerRuntime {
    orchestrator: Orchestrator,
    registry: Arc<ScheduleRegistry>,
    config: SchedulerConfig,
}

impl SchedulerRuntime {
    pub fn new(orchestrator: Orchestrator, registry: Arc<ScheduleRegistry>, config: SchedulerConfig) -> Self {
        Self {
            orchestrator,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<ScheduleRegistry> {
        &self.registry
    }

    /// Runs ticks until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            self.tick();
            if !shutdown.sleep_or_cancelled(self.config.tick_interval).await {
                tracing::info!("scheduler shutdown requested");
                return;
            }
        }
    }

    pub fn tick(&self) {
        let now = current_unix_timestamp_ms();
        for entry in self.registry.list_due(now) {
            if let Err(error) = self.dispatch(&entry, now) {
                tracing::warn!(schedule_id = %entry.id, %error, "scheduled dispatch failed");
            }
        }
        for entry in self.registry.list_overlapped(now) {
            self.drop_overlapped_fire(&entry, now);
        }
    }

    /// A fire whose instant elapsed while the previous run for the same
    /// schedule is still in flight is never submitted as a second run; it
    /// is counted against `missed_fires` instead (§4.F "Catch-up policy").
    fn drop_overlapped_fire(&self, entry: &ScheduleEntry, now_unix_ms: u64) {
        let due_ts = entry.next_run_ts_ms.unwrap_or(now_unix_ms);
        match advance(&entry.cron_expression, &entry.timezone, due_ts, now_unix_ms) {
            Ok(advanced) => {
                tracing::warn!(schedule_id = %entry.id, "schedule fire overlapped an in-flight run, dropping");
                self.registry.record_missed_overlap(&entry.id, advanced);
            }
            Err(error) => {
                tracing::warn!(schedule_id = %entry.id, %error, "failed to advance overlapped schedule");
            }
        }
    }

    /// Submits an out-of-band run for `schedule_id` regardless of its
    /// next-fire time (§6 "trigger schedule").
    pub fn trigger_now(&self, schedule_id: &str) -> Result<String, QaError> {
        let entry = self
            .registry
            .get(schedule_id)
            .ok_or_else(|| QaError::not_found(format!("schedule '{schedule_id}' not found")))?;
        self.registry.mark_running(schedule_id)?;
        match self.submit_for(&entry) {
            Ok(run_id) => {
                self.spawn_observer(schedule_id.to_string(), run_id.clone());
                Ok(run_id)
            }
            Err(error) => {
                self.registry.observe_terminal(schedule_id, qaflow_contract::RunStatus::Error);
                Err(error)
            }
        }
    }

    fn dispatch(&self, entry: &ScheduleEntry, now_unix_ms: u64) -> Result<(), QaError> {
        self.registry.mark_running(&entry.id)?;

        let due_ts = entry.next_run_ts_ms.unwrap_or(now_unix_ms);
        let advanced = advance(&entry.cron_expression, &entry.timezone, due_ts, now_unix_ms)?;
        self.registry.apply_advance(&entry.id, advanced);

        match self.submit_for(entry) {
            Ok(run_id) => {
                self.spawn_observer(entry.id.clone(), run_id);
                Ok(())
            }
            Err(error) => {
                self.registry.observe_terminal(&entry.id, qaflow_contract::RunStatus::Error);
                Err(error)
            }
        }
    }

    fn submit_for(&self, entry: &ScheduleEntry) -> Result<String, QaError> {
        let opts = RunOptions {
            triggered_by: TriggeredBy::Schedule,
            schedule_id: Some(entry.id.clone()),
            ..RunOptions::default()
        };
        self.orchestrator.submit(&entry.test_id, opts)
    }

    fn spawn_observer(&self, schedule_id: String, run_id: String) {
        let orchestrator = self.orchestrator.clone();
        let registry = self.registry.clone();
        tokio::spawn(async move {
            observe_until_terminal(orchestrator, registry, schedule_id, run_id).await;
        });
    }
}

async fn observe_until_terminal(
    orchestrator: Orchestrator,
    registry: Arc<ScheduleRegistry>,
    schedule_id: String,
    run_id: String,
) {
    loop {
        match orchestrator.get(&run_id) {
            Ok(run) if run.status.is_terminal() => {
                registry.observe_terminal(&schedule_id, run.status);
                return;
            }
            Ok(_) => {}
            Err(_) => return,
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
