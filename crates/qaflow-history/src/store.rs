use std::collections::HashMap;
use std::sync::Mutex;

use qaflow_contract::{FailureCategory, QualitySnapshot, RunHistory};
use qaflow_core::QaError;

/// In-memory append-only history plus the `FailurePattern` clustering
/// state the consumer maintains on every terminal run (§3, §4.G).
#[derive(Debug, Default)]
pub struct HistoryStore {
    history: Mutex<Vec<RunHistory>>,
    patterns: Mutex<HashMap<(String, String), qaflow_contract::FailurePattern>>,
    snapshots: Mutex<HashMap<String, QualitySnapshot>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_run(&self, row: RunHistory) {
        self.history.lock().expect("history mutex poisoned").push(row);
    }

    /// Merges an occurrence into the `(test_name, error_signature)`
    /// `FailurePattern` row, creating it on first sight (§3 merge
    /// invariant).
    pub fn upsert_pattern(&self, test_name: &str, error_signature: &str, category: FailureCategory, occurred_at_unix_ms: u64) {
        let mut patterns = self.patterns.lock().expect("patterns mutex poisoned");
        let key = (test_name.to_string(), error_signature.to_string());
        patterns
            .entry(key)
            .and_modify(|pattern| pattern.record_occurrence(occurred_at_unix_ms))
            .or_insert_with(|| qaflow_contract::FailurePattern {
                test_name: test_name.to_string(),
                error_signature: error_signature.to_string(),
                category,
                occurrences: 1,
                first_seen_unix_ms: occurred_at_unix_ms,
                last_seen_unix_ms: occurred_at_unix_ms,
                impact_score: 1.0,
                resolved: false,
            });
    }

    pub fn history(&self) -> Vec<RunHistory> {
        self.history.lock().expect("history mutex poisoned").clone()
    }

    pub fn history_window(&self, since_unix_ms: u64, until_unix_ms: u64) -> Vec<RunHistory> {
        self.history
            .lock()
            .expect("history mutex poisoned")
            .iter()
            .filter(|row| row.executed_at_unix_ms >= since_unix_ms && row.executed_at_unix_ms <= until_unix_ms)
            .cloned()
            .collect()
    }

    pub fn patterns(&self) -> Vec<qaflow_contract::FailurePattern> {
        self.patterns.lock().expect("patterns mutex poisoned").values().cloned().collect()
    }

    /// Stores a `QualitySnapshot`, enforcing the §3 write-once-per-day
    /// invariant.
    pub fn put_snapshot(&self, snapshot: QualitySnapshot) -> Result<(), QaError> {
        let mut snapshots = self.snapshots.lock().expect("snapshots mutex poisoned");
        if snapshots.contains_key(&snapshot.date) {
            return Err(QaError::conflict(format!("quality snapshot for '{}' already exists", snapshot.date)));
        }
        snapshots.insert(snapshot.date.clone(), snapshot);
        Ok(())
    }

    pub fn snapshot(&self, day: &str) -> Option<QualitySnapshot> {
        self.snapshots.lock().expect("snapshots mutex poisoned").get(day).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaflow_contract::{BrowserKind, RunStatus};

    fn row(test_name: &str) -> RunHistory {
        RunHistory {
            run_id: "r1".to_string(),
            test_name: test_name.to_string(),
            status: RunStatus::Passed,
            duration_ms: 100,
            failure_type: None,
            browser: BrowserKind::Chrome,
            environment: "staging".to_string(),
            executed_at_unix_ms: 1_000,
        }
    }

    #[test]
    fn functional_append_then_history_window_filters_by_range() {
        let store = HistoryStore::new();
        store.append_run(row("a"));
        let mut later = row("b");
        later.executed_at_unix_ms = 5_000;
        store.append_run(later);

        assert_eq!(store.history_window(0, 2_000).len(), 1);
        assert_eq!(store.history_window(0, 10_000).len(), 2);
    }

    #[test]
    fn functional_upsert_pattern_merges_repeated_signature() {
        let store = HistoryStore::new();
        store.upsert_pattern("login", "timeout waiting for STR", FailureCategory::Timeout, 1_000);
        store.upsert_pattern("login", "timeout waiting for STR", FailureCategory::Timeout, 2_000);
        let patterns = store.patterns();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].occurrences, 2);
        assert_eq!(patterns[0].last_seen_unix_ms, 2_000);
    }

    #[test]
    fn regression_put_snapshot_rejects_duplicate_day() {
        let store = HistoryStore::new();
        let snapshot = QualitySnapshot {
            date: "2026-01-01".to_string(),
            total_all: 1,
            total_active: 1,
            total_stable: 1,
            total_flaky: 0,
            total_failing: 0,
            avg_pass_rate: 100.0,
            avg_flakiness_score: 0.0,
            overall_health_score: 100.0,
            total_executions: 1,
            avg_execution_ms: 100.0,
        };
        store.put_snapshot(snapshot.clone()).expect("first write should succeed");
        let error = store.put_snapshot(snapshot).expect_err("second write should conflict");
        assert!(matches!(error, QaError::Conflict { .. }));
    }
}
