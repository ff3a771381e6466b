use qaflow_contract::{QualitySnapshot, RunHistory};
use qaflow_flaky::{group_by_test, suite_health};

/// Builds the `QualitySnapshot` for `day` (a `YYYY-MM-DD` UTC calendar
/// date, per the Open Question decision that the snapshot clock is fixed
/// to UTC) from the runs executed that day. Pure function: callers slice
/// the day's window out of the `HistoryStore` themselves.
pub fn build_quality_snapshot(day: &str, day_history: &[RunHistory]) -> QualitySnapshot {
    let aggregates = group_by_test(day_history);
    let health = suite_health(day_history);

    let total_all = aggregates.len() as u64;
    let total_stable = aggregates
        .iter()
        .filter(|aggregate| matches!(aggregate.stability, qaflow_flaky::StabilityLabel::Stable))
        .count() as u64;
    let total_flaky = aggregates.iter().filter(|aggregate| aggregate.stability.is_flaky()).count() as u64;
    let total_failing = aggregates.iter().filter(|aggregate| aggregate.pass_rate == 0.0).count() as u64;

    let mut distinct_active: Vec<&str> = day_history.iter().map(|row| row.test_name.as_str()).collect();
    distinct_active.sort_unstable();
    distinct_active.dedup();
    let total_active = distinct_active.len() as u64;

    let (avg_pass_rate, avg_flakiness_score) = if aggregates.is_empty() {
        (0.0, 0.0)
    } else {
        let sum_pass_rate: f64 = aggregates.iter().map(|aggregate| aggregate.pass_rate).sum();
        let sum_flakiness: f64 = aggregates.iter().map(|aggregate| aggregate.flakiness_score).sum();
        (sum_pass_rate / total_all as f64, sum_flakiness / total_all as f64)
    };

    let total_executions = day_history.len() as u64;
    let avg_execution_ms = if total_executions == 0 {
        0.0
    } else {
        day_history.iter().map(|row| row.duration_ms).sum::<u64>() as f64 / total_executions as f64
    };

    QualitySnapshot {
        date: day.to_string(),
        total_all,
        total_active,
        total_stable,
        total_flaky,
        total_failing,
        avg_pass_rate,
        avg_flakiness_score,
        overall_health_score: health.score,
        total_executions,
        avg_execution_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaflow_contract::{BrowserKind, RunStatus};

    fn row(test_name: &str, status: RunStatus, duration_ms: u64) -> RunHistory {
        RunHistory {
            run_id: "r".to_string(),
            test_name: test_name.to_string(),
            status,
            duration_ms,
            failure_type: None,
            browser: BrowserKind::Chrome,
            environment: "staging".to_string(),
            executed_at_unix_ms: 1,
        }
    }

    #[test]
    fn functional_build_quality_snapshot_aggregates_stable_and_flaky_counts() {
        let history = vec![
            row("stable", RunStatus::Passed, 100),
            row("stable", RunStatus::Passed, 100),
            row("stable", RunStatus::Passed, 100),
            row("flaky", RunStatus::Passed, 100),
            row("flaky", RunStatus::Failed, 100),
            row("flaky", RunStatus::Passed, 100),
            row("flaky", RunStatus::Failed, 100),
        ];
        let snapshot = build_quality_snapshot("2026-07-30", &history);
        assert_eq!(snapshot.date, "2026-07-30");
        assert_eq!(snapshot.total_all, 2);
        assert_eq!(snapshot.total_stable, 1);
        assert_eq!(snapshot.total_flaky, 1);
        assert_eq!(snapshot.total_executions, 7);
    }

    #[test]
    fn unit_build_quality_snapshot_handles_empty_window() {
        let snapshot = build_quality_snapshot("2026-07-30", &[]);
        assert_eq!(snapshot.total_all, 0);
        assert_eq!(snapshot.total_executions, 0);
        assert_eq!(snapshot.avg_pass_rate, 0.0);
    }
}
