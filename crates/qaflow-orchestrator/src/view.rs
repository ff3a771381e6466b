use qaflow_contract::{Run, RunStatus};

/// A read-only snapshot returned by `get`/`list` (§4.E). Deliberately the
/// same shape as the stored `Run`: the orchestrator does not maintain a
/// separate public projection.
pub type RunView = Run;

/// Filter for `list` (§6 "list runs").
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub test_id: Option<String>,
    pub status: Option<RunStatus>,
    pub since_unix_ms: Option<u64>,
    pub until_unix_ms: Option<u64>,
}

impl ListFilter {
    fn matches(&self, run: &Run) -> bool {
        if let Some(test_id) = &self.test_id {
            if &run.test_id != test_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if run.status != status {
                return false;
            }
        }
        if let Some(since) = self.since_unix_ms {
            if run.start_ts_ms.unwrap_or(0) < since {
                return false;
            }
        }
        if let Some(until) = self.until_unix_ms {
            if run.start_ts_ms.unwrap_or(u64::MAX) > until {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self { offset: 0, limit: 50 }
    }
}

/// Applies `filter` then `paging` over `runs`, newest-first by
/// `start_ts_ms` (ties broken by run id for determinism).
pub fn filter_and_page(mut runs: Vec<Run>, filter: &ListFilter, paging: Paging) -> Vec<Run> {
    runs.retain(|run| filter.matches(run));
    runs.sort_by(|left, right| {
        right
            .start_ts_ms
            .cmp(&left.start_ts_ms)
            .then_with(|| left.id.cmp(&right.id))
    });
    runs.into_iter().skip(paging.offset).take(paging.limit).collect()
}
