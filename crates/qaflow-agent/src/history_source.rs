use qaflow_contract::RunHistory;

/// Supplies the recent-history window the agent needs to confirm a
/// test is still flaky before spending a proposer call (§4.I item 1).
/// Kept as a trait rather than a direct dependency on the History
/// Recorder's store so this crate stays decoupled from it, the same
/// way the proposer is kept external to the agent's control flow.
pub trait HistorySource: Send + Sync {
    fn recent_history(&self, test_name: &str) -> Vec<RunHistory>;
}
