use qaflow_contract::RunHistory;

use crate::aggregate::group_by_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationTrend {
    Improving,
    Stable,
    Degrading,
    InsufficientData,
}

/// One row of the `perf(window)` view (§4.H).
#[derive(Debug, Clone, PartialEq)]
pub struct PerfView {
    pub test_name: String,
    pub total_runs: usize,
    pub mean_duration_ms: f64,
    pub median_duration_ms: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub stddev_duration_ms: f64,
    pub trend: DurationTrend,
}

/// Duration statistics and trend per test, over tests with at least
/// `MIN_OBS` runs (§4.H "Performance").
pub fn perf(history: &[RunHistory]) -> Vec<PerfView> {
    group_by_test(history)
        .into_iter()
        .map(|aggregate| {
            let mut durations: Vec<u64> = aggregate.runs.iter().map(|row| row.duration_ms).collect();
            durations.sort_unstable();
            let total = durations.len();
            let sum: u64 = durations.iter().sum();
            let mean = sum as f64 / total as f64;
            let median = median_of_sorted(&durations);
            let variance = durations.iter().map(|d| (*d as f64 - mean).powi(2)).sum::<f64>() / total as f64;
            let stddev = variance.sqrt();

            let mut chronological = aggregate.runs.clone();
            chronological.sort_by_key(|row| row.executed_at_unix_ms);
            let trend = if chronological.len() < 5 {
                DurationTrend::InsufficientData
            } else {
                trend_from_halves(&chronological)
            };

            PerfView {
                test_name: aggregate.test_name.to_string(),
                total_runs: total,
                mean_duration_ms: mean,
                median_duration_ms: median,
                min_duration_ms: *durations.first().expect("non-empty group"),
                max_duration_ms: *durations.last().expect("non-empty group"),
                stddev_duration_ms: stddev,
                trend,
            }
        })
        .collect()
}

fn median_of_sorted(sorted: &[u64]) -> f64 {
    let len = sorted.len();
    if len % 2 == 0 {
        (sorted[len / 2 - 1] as f64 + sorted[len / 2] as f64) / 2.0
    } else {
        sorted[len / 2] as f64
    }
}

fn trend_from_halves(chronological: &[&RunHistory]) -> DurationTrend {
    let mid = chronological.len() / 2;
    let first_half = &chronological[..mid];
    let second_half = &chronological[mid..];
    let mean_of = |rows: &[&RunHistory]| {
        rows.iter().map(|row| row.duration_ms).sum::<u64>() as f64 / rows.len() as f64
    };
    let first_mean = mean_of(first_half);
    let second_mean = mean_of(second_half);
    if first_mean == 0.0 {
        return DurationTrend::Stable;
    }
    let change = (second_mean - first_mean) / first_mean;
    if change >= 0.10 {
        DurationTrend::Degrading
    } else if change <= -0.10 {
        DurationTrend::Improving
    } else {
        DurationTrend::Stable
    }
}
