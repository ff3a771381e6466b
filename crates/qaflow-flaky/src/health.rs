use qaflow_contract::{RunHistory, RunStatus};

use crate::aggregate::group_by_test;

/// Suite-wide health rollup (§4.H "Health score").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuiteHealth {
    pub score: f64,
    pub total_tests: u64,
    pub flaky_tests: u64,
    pub overall_pass_rate: f64,
}

/// `clamp(0, 100, 0.7*pass_rate + (1 - flaky/total)*30)`, where
/// `pass_rate` is the overall run-level pass rate across the window and
/// `total`/`flaky` count distinct tests with at least `MIN_OBS`
/// observations.
pub fn suite_health(history: &[RunHistory]) -> SuiteHealth {
    let aggregates = group_by_test(history);
    let total_tests = aggregates.len() as u64;
    let flaky_tests = aggregates.iter().filter(|aggregate| aggregate.stability.is_flaky()).count() as u64;

    let total_runs = history.len();
    let overall_pass_rate = if total_runs == 0 {
        0.0
    } else {
        100.0 * history.iter().filter(|row| row.status == RunStatus::Passed).count() as f64 / total_runs as f64
    };

    let non_flaky_fraction = if total_tests == 0 {
        1.0
    } else {
        1.0 - flaky_tests as f64 / total_tests as f64
    };
    let raw_score = 0.7 * overall_pass_rate + non_flaky_fraction * 30.0;

    SuiteHealth {
        score: raw_score.clamp(0.0, 100.0),
        total_tests,
        flaky_tests,
        overall_pass_rate,
    }
}
