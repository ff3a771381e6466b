use crate::run::Run;

/// Emitted by the orchestrator on every terminal run transition (§4.G).
/// Carries the test name alongside the run since `RunHistory` denormalizes
/// it for the Flakiness Analyzer's window queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalRunEvent {
    pub run: Run,
    pub test_name: String,
}
