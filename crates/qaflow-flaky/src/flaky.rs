use qaflow_contract::RunHistory;

use crate::aggregate::{group_by_test, StabilityLabel};

/// One row of the `flaky(window)` view (§4.H).
#[derive(Debug, Clone, PartialEq)]
pub struct FlakyView {
    pub test_name: String,
    pub total_runs: usize,
    pub pass_rate: f64,
    pub flakiness_score: f64,
    pub stability: StabilityLabel,
}

/// Tests whose stability label is FLAKY, VERY_FLAKY, or UNRELIABLE,
/// sorted by `flakiness_score` descending.
pub fn flaky(history: &[RunHistory]) -> Vec<FlakyView> {
    let mut views: Vec<FlakyView> = group_by_test(history)
        .into_iter()
        .filter(|aggregate| aggregate.stability.is_flaky())
        .map(|aggregate| FlakyView {
            test_name: aggregate.test_name.to_string(),
            total_runs: aggregate.total,
            pass_rate: aggregate.pass_rate,
            flakiness_score: aggregate.flakiness_score,
            stability: aggregate.stability,
        })
        .collect();
    views.sort_by(|left, right| {
        right
            .flakiness_score
            .partial_cmp(&left.flakiness_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    views
}
