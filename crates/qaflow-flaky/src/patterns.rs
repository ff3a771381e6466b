use std::collections::HashMap;

use qaflow_contract::{BrowserKind, FailureCategory, RunHistory, RunStatus};
use qaflow_core::normalize_failure_signature;

/// One row of the `patterns(window)` view (§4.H "Patterns"): failed runs
/// grouped by normalized first-line signature, the same normalization
/// the History Recorder applies when upserting `FailurePattern` (§4.G).
#[derive(Debug, Clone, PartialEq)]
pub struct PatternView {
    pub signature: String,
    pub category: Option<FailureCategory>,
    pub count: usize,
    pub percentage_of_failures: f64,
    pub affected_tests: Vec<String>,
    pub affected_browsers: Vec<BrowserKind>,
}

/// Groups failed runs in `history` by normalized signature of
/// `error_summary`-derived text carried on `RunHistory` (the Failure
/// Classifier's `exception_kind`/`message` are not retained past the
/// Run; `failure_type` plus the test name stand in for the signature
/// input here).
pub fn patterns(history: &[RunHistory]) -> Vec<PatternView> {
    let failed: Vec<&RunHistory> = history.iter().filter(|row| row.status == RunStatus::Failed).collect();
    let total_failures = failed.len();
    if total_failures == 0 {
        return Vec::new();
    }

    struct Bucket<'a> {
        category: Option<FailureCategory>,
        tests: Vec<&'a str>,
        browsers: Vec<BrowserKind>,
    }

    let mut buckets: HashMap<String, Bucket> = HashMap::new();
    for row in &failed {
        let raw = row
            .failure_type
            .map(|category| format!("{category:?} in {}", row.test_name))
            .unwrap_or_else(|| format!("failure in {}", row.test_name));
        let signature = normalize_failure_signature(&raw);
        let bucket = buckets.entry(signature).or_insert_with(|| Bucket {
            category: row.failure_type,
            tests: Vec::new(),
            browsers: Vec::new(),
        });
        bucket.tests.push(row.test_name.as_str());
        bucket.browsers.push(row.browser);
    }

    let mut views: Vec<PatternView> = buckets
        .into_iter()
        .map(|(signature, bucket)| {
            let mut affected_tests: Vec<String> = bucket.tests.iter().map(|t| t.to_string()).collect();
            affected_tests.sort();
            affected_tests.dedup();
            let mut affected_browsers = bucket.browsers.clone();
            affected_browsers.sort_by_key(|kind| format!("{kind:?}"));
            affected_browsers.dedup();
            let count = bucket.tests.len();
            PatternView {
                signature,
                category: bucket.category,
                count,
                percentage_of_failures: 100.0 * count as f64 / total_failures as f64,
                affected_tests,
                affected_browsers,
            }
        })
        .collect();
    views.sort_by(|left, right| right.count.cmp(&left.count));
    views
}
