use std::collections::HashMap;
use std::sync::Mutex;

use qaflow_contract::{RunStatus, ScheduleEntry};
use qaflow_core::{current_unix_timestamp_ms, generate_id, QaError};

use crate::next_fire::{next_fire_unix_ms, validate_cron, ScheduleAdvance};

/// In-process store of `ScheduleEntry` rows (§3 "ScheduleEntry", §4.F).
/// The tick loop and the intake API (`create`/`update`/`enable`/`disable`/
/// `trigger_now`/`list_due`) both go through this registry; it is the
/// single place that enforces the overlap-prevention invariant.
#[derive(Debug, Default)]
pub struct ScheduleRegistry {
    entries: Mutex<HashMap<String, ScheduleEntry>>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, test_id: &str, cron_expression: &str, timezone: &str) -> Result<String, QaError> {
        validate_cron(cron_expression, timezone)?;
        let now = current_unix_timestamp_ms();
        let next_run_ts_ms = next_fire_unix_ms(cron_expression, timezone, now)?;

        let mut entry = ScheduleEntry::new(
            generate_id("sched"),
            test_id.to_string(),
            cron_expression.to_string(),
            timezone.to_string(),
        );
        entry.next_run_ts_ms = Some(next_run_ts_ms);
        let id = entry.id.clone();
        self.entries.lock().expect("schedule registry mutex poisoned").insert(id.clone(), entry);
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<ScheduleEntry> {
        self.entries.lock().expect("schedule registry mutex poisoned").get(id).cloned()
    }

    /// Patches the cron expression and/or timezone, revalidating and
    /// recomputing `next_run_ts_ms` from now.
    pub fn update(&self, id: &str, cron_expression: Option<&str>, timezone: Option<&str>) -> Result<(), QaError> {
        let mut entries = self.entries.lock().expect("schedule registry mutex poisoned");
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| QaError::not_found(format!("schedule '{id}' not found")))?;
        let new_cron = cron_expression.unwrap_or(&entry.cron_expression).to_string();
        let new_tz = timezone.unwrap_or(&entry.timezone).to_string();
        validate_cron(&new_cron, &new_tz)?;
        let next_run_ts_ms = next_fire_unix_ms(&new_cron, &new_tz, current_unix_timestamp_ms())?;
        entry.cron_expression = new_cron;
        entry.timezone = new_tz;
        entry.next_run_ts_ms = Some(next_run_ts_ms);
        Ok(())
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), QaError> {
        let mut entries = self.entries.lock().expect("schedule registry mutex poisoned");
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| QaError::not_found(format!("schedule '{id}' not found")))?;
        entry.enabled = enabled;
        Ok(())
    }

    /// Entries currently due: enabled, not already running, `next_run_ts_ms
    /// <= now`.
    pub fn list_due(&self, now_unix_ms: u64) -> Vec<ScheduleEntry> {
        self.entries
            .lock()
            .expect("schedule registry mutex poisoned")
            .values()
            .filter(|entry| entry.is_due(now_unix_ms))
            .cloned()
            .collect()
    }

    /// Marks `id` running, for both the tick loop's dequeue and
    /// `trigger_now`'s out-of-band submission. Rejects a schedule already
    /// running to uphold the §3 overlap-prevention invariant even though
    /// §6 doesn't name a `CONFLICT` failure mode for `trigger_now`.
    pub fn mark_running(&self, id: &str) -> Result<(), QaError> {
        let mut entries = self.entries.lock().expect("schedule registry mutex poisoned");
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| QaError::not_found(format!("schedule '{id}' not found")))?;
        if entry.running {
            return Err(QaError::conflict(format!("schedule '{id}' already has a run in flight")));
        }
        entry.running = true;
        Ok(())
    }

    /// Recomputes `next_run_ts_ms` and folds in any missed fires detected
    /// by the tick loop (§4.F "Catch-up policy").
    pub fn apply_advance(&self, id: &str, advance: ScheduleAdvance) {
        let mut entries = self.entries.lock().expect("schedule registry mutex poisoned");
        if let Some(entry) = entries.get_mut(id) {
            entry.next_run_ts_ms = Some(advance.next_run_ts_ms);
            entry.missed_fires = entry.missed_fires.saturating_add(advance.missed);
        }
    }

    /// Entries whose fire instant has elapsed while a previous run for them
    /// is still in flight. The tick loop drops these instead of dispatching
    /// a second concurrent run.
    pub fn list_overlapped(&self, now_unix_ms: u64) -> Vec<ScheduleEntry> {
        self.entries
            .lock()
            .expect("schedule registry mutex poisoned")
            .values()
            .filter(|entry| entry.is_overlapped_due(now_unix_ms))
            .cloned()
            .collect()
    }

    /// Advances `id` past a fire that was dropped for overlapping with an
    /// in-flight run, counting the dropped fire itself plus any further
    /// occurrences that elapsed in between as missed (§4.F "Catch-up
    /// policy", scenario 5: the overlapped fire is never submitted).
    pub fn record_missed_overlap(&self, id: &str, advance: ScheduleAdvance) {
        let mut entries = self.entries.lock().expect("schedule registry mutex poisoned");
        if let Some(entry) = entries.get_mut(id) {
            entry.next_run_ts_ms = Some(advance.next_run_ts_ms);
            entry.missed_fires = entry.missed_fires.saturating_add(advance.missed + 1);
        }
    }

    /// Called when the run the scheduler submitted reaches a terminal
    /// status: clears `running`, bumps counters, stamps `last_run_ts_ms`.
    pub fn observe_terminal(&self, id: &str, status: RunStatus) {
        let mut entries = self.entries.lock().expect("schedule registry mutex poisoned");
        if let Some(entry) = entries.get_mut(id) {
            entry.running = false;
            entry.last_run_ts_ms = Some(current_unix_timestamp_ms());
            entry.total_runs = entry.total_runs.saturating_add(1);
            match status {
                RunStatus::Passed => entry.success_runs = entry.success_runs.saturating_add(1),
                _ => entry.failure_runs = entry.failure_runs.saturating_add(1),
            }
        }
    }

    pub fn list(&self) -> Vec<ScheduleEntry> {
        self.entries.lock().expect("schedule registry mutex poisoned").values().cloned().collect()
    }
}
