use qaflow_agent::HistorySource;
use qaflow_contract::RunHistory;

/// A `HistorySource` backed by a fixed, pre-loaded window (the contents
/// of the `--history` JSON file). Filters by test name the same way
/// `HistoryStore::history_window` filters by time.
pub struct StaticHistorySource {
    rows: Vec<RunHistory>,
}

impl StaticHistorySource {
    pub fn new(rows: Vec<RunHistory>) -> Self {
        Self { rows }
    }
}

impl HistorySource for StaticHistorySource {
    fn recent_history(&self, test_name: &str) -> Vec<RunHistory> {
        self.rows.iter().filter(|row| row.test_name == test_name).cloned().collect()
    }
}
