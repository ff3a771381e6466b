use serde::{Deserialize, Serialize};

/// A cron-driven trigger that feeds the orchestrator (§3 "ScheduleEntry").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub id: String,
    pub test_id: String,
    pub cron_expression: String,
    pub timezone: String,
    pub enabled: bool,
    pub running: bool,
    pub last_run_ts_ms: Option<u64>,
    pub next_run_ts_ms: Option<u64>,
    pub total_runs: u64,
    pub success_runs: u64,
    pub failure_runs: u64,
    pub missed_fires: u64,
}

impl ScheduleEntry {
    pub fn new(id: String, test_id: String, cron_expression: String, timezone: String) -> Self {
        Self {
            id,
            test_id,
            cron_expression,
            timezone,
            enabled: true,
            running: false,
            last_run_ts_ms: None,
            next_run_ts_ms: None,
            total_runs: 0,
            success_runs: 0,
            failure_runs: 0,
            missed_fires: 0,
        }
    }

    pub fn is_due(&self, now_unix_ms: u64) -> bool {
        self.enabled && !self.running && self.next_run_ts_ms.is_some_and(|next| next <= now_unix_ms)
    }

    /// True when this entry's fire instant has elapsed while a previous run
    /// for it is still in flight. The tick loop drops such a fire instead of
    /// queuing a second concurrent run (§4.F "Catch-up policy").
    pub fn is_overlapped_due(&self, now_unix_ms: u64) -> bool {
        self.enabled && self.running && self.next_run_ts_ms.is_some_and(|next| next <= now_unix_ms)
    }
}
