use serde::{Deserialize, Serialize};

use crate::run::{BrowserKind, FailureCategory, RunStatus};

/// Append-only record written per terminal `Run` (§3 "RunHistory").
/// Denormalizes `test_name` so analytics never needs a join back to the
/// live `Run`/`Test` tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunHistory {
    pub run_id: String,
    pub test_name: String,
    pub status: RunStatus,
    pub duration_ms: u64,
    pub failure_type: Option<FailureCategory>,
    pub browser: BrowserKind,
    pub environment: String,
    pub executed_at_unix_ms: u64,
}

/// One calendar day's aggregate health rollup (§3 "QualitySnapshot").
/// `date` is always a UTC calendar date per the Open Question decision
/// in §9: the snapshot clock is fixed to UTC regardless of host timezone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualitySnapshot {
    pub date: String,
    pub total_all: u64,
    pub total_active: u64,
    pub total_stable: u64,
    pub total_flaky: u64,
    pub total_failing: u64,
    pub avg_pass_rate: f64,
    pub avg_flakiness_score: f64,
    pub overall_health_score: f64,
    pub total_executions: u64,
    pub avg_execution_ms: f64,
}

/// A clustered failure signature (§3 "FailurePattern"). Unique on
/// `(test_name, error_signature)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailurePattern {
    pub test_name: String,
    pub error_signature: String,
    pub category: FailureCategory,
    pub occurrences: u64,
    pub first_seen_unix_ms: u64,
    pub last_seen_unix_ms: u64,
    pub impact_score: f64,
    pub resolved: bool,
}

impl FailurePattern {
    /// Merges an incoming failure occurrence: increments the count and
    /// advances `last_seen` per the §3 merge invariant.
    pub fn record_occurrence(&mut self, occurred_at_unix_ms: u64) {
        self.occurrences = self.occurrences.saturating_add(1);
        self.last_seen_unix_ms = self.last_seen_unix_ms.max(occurred_at_unix_ms);
        self.impact_score = self.occurrences as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_failure_pattern_record_occurrence_increments_and_advances_last_seen() {
        let mut pattern = FailurePattern {
            test_name: "login flow".to_string(),
            error_signature: "timeout waiting for STR".to_string(),
            category: FailureCategory::Timeout,
            occurrences: 1,
            first_seen_unix_ms: 1_000,
            last_seen_unix_ms: 1_000,
            impact_score: 1.0,
            resolved: false,
        };
        pattern.record_occurrence(2_000);
        assert_eq!(pattern.occurrences, 2);
        assert_eq!(pattern.last_seen_unix_ms, 2_000);
        assert_eq!(pattern.impact_score, 2.0);
    }

    #[test]
    fn regression_record_occurrence_never_moves_last_seen_backwards() {
        let mut pattern = FailurePattern {
            test_name: "t".to_string(),
            error_signature: "s".to_string(),
            category: FailureCategory::Unknown,
            occurrences: 1,
            first_seen_unix_ms: 5_000,
            last_seen_unix_ms: 5_000,
            impact_score: 1.0,
            resolved: false,
        };
        pattern.record_occurrence(1_000);
        assert_eq!(pattern.last_seen_unix_ms, 5_000);
    }
}
