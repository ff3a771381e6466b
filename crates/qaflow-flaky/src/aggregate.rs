use std::collections::HashMap;

use qaflow_contract::{RunHistory, RunStatus};

/// Minimum observation count before a test is scored at all (§4.H).
pub const MIN_OBS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StabilityLabel {
    Stable,
    MostlyStable,
    Flaky,
    VeryFlaky,
    Unreliable,
}

impl StabilityLabel {
    pub fn from_pass_rate(pass_rate: f64) -> Self {
        if pass_rate >= 95.0 {
            Self::Stable
        } else if pass_rate >= 80.0 {
            Self::MostlyStable
        } else if pass_rate >= 50.0 {
            Self::Flaky
        } else if pass_rate >= 20.0 {
            Self::VeryFlaky
        } else {
            Self::Unreliable
        }
    }

    pub fn is_flaky(self) -> bool {
        matches!(self, Self::Flaky | Self::VeryFlaky | Self::Unreliable)
    }
}

/// Per-test rollup over a window, the shared basis for `flaky`, `perf`,
/// and `suite_health`.
#[derive(Debug, Clone)]
pub struct TestAggregate<'a> {
    pub test_name: &'a str,
    pub runs: Vec<&'a RunHistory>,
    pub total: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub flakiness_score: f64,
    pub stability: StabilityLabel,
}

/// Groups `history` by `test_name` and excludes groups with fewer than
/// `MIN_OBS` runs.
pub fn group_by_test(history: &[RunHistory]) -> Vec<TestAggregate<'_>> {
    let mut groups: HashMap<&str, Vec<&RunHistory>> = HashMap::new();
    for row in history {
        groups.entry(row.test_name.as_str()).or_default().push(row);
    }

    groups
        .into_iter()
        .filter(|(_, runs)| runs.len() >= MIN_OBS)
        .map(|(test_name, runs)| {
            let total = runs.len();
            let passed = runs.iter().filter(|row| row.status == RunStatus::Passed).count();
            let pass_rate = 100.0 * passed as f64 / total as f64;
            let flakiness_score = 100.0 - 2.0 * (pass_rate - 50.0).abs();
            TestAggregate {
                test_name,
                runs,
                total,
                passed,
                pass_rate,
                flakiness_score,
                stability: StabilityLabel::from_pass_rate(pass_rate),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaflow_contract::BrowserKind;

    fn row(test_name: &str, status: RunStatus, duration_ms: u64, executed_at_unix_ms: u64) -> RunHistory {
        RunHistory {
            run_id: format!("r-{executed_at_unix_ms}"),
            test_name: test_name.to_string(),
            status,
            duration_ms,
            failure_type: None,
            browser: BrowserKind::Chrome,
            environment: "staging".to_string(),
            executed_at_unix_ms,
        }
    }

    #[test]
    fn unit_group_by_test_excludes_groups_below_min_obs() {
        let history = vec![row("a", RunStatus::Passed, 100, 1), row("a", RunStatus::Passed, 100, 2)];
        assert!(group_by_test(&history).is_empty());
    }

    #[test]
    fn functional_group_by_test_computes_pass_rate_and_flakiness_score() {
        let history = vec![
            row("a", RunStatus::Passed, 100, 1),
            row("a", RunStatus::Failed, 100, 2),
            row("a", RunStatus::Passed, 100, 3),
            row("a", RunStatus::Passed, 100, 4),
        ];
        let groups = group_by_test(&history);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pass_rate, 75.0);
        assert_eq!(groups[0].flakiness_score, 50.0);
        assert_eq!(groups[0].stability, StabilityLabel::Flaky);
    }

    #[test]
    fn regression_flakiness_score_peaks_symmetrically_at_50_percent_pass_rate() {
        let all_pass = vec![
            row("a", RunStatus::Passed, 100, 1),
            row("a", RunStatus::Passed, 100, 2),
            row("a", RunStatus::Passed, 100, 3),
        ];
        let half_pass = vec![
            row("b", RunStatus::Passed, 100, 1),
            row("b", RunStatus::Failed, 100, 2),
            row("b", RunStatus::Passed, 100, 3),
            row("b", RunStatus::Failed, 100, 4),
        ];
        let stable_score = group_by_test(&all_pass)[0].flakiness_score;
        let flaky_score = group_by_test(&half_pass)[0].flakiness_score;
        assert!(flaky_score > stable_score);
    }
}
