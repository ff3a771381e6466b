use qaflow_contract::Step;
use qaflow_core::QaError;

/// A candidate change for a flaky test, returned by a `ChangeProposer`
/// (§4.I item 2). The rationale is carried for the action log only;
/// the agent itself treats the change as opaque.
#[derive(Debug, Clone)]
pub struct ProposedChange {
    pub script: Vec<Step>,
    pub rationale: String,
    pub cost: u64,
}

/// The external proposer (§4.I item 2: "treated as a pluggable black
/// box returning a change set plus a rationale"). Implementations may
/// call out to an LLM, a static heuristic, or a fixture in tests; the
/// agent itself never inspects the script it gets back beyond applying
/// it via the Orchestrator's write-through.
pub trait ChangeProposer: Send + Sync {
    fn propose(&self, test_name: &str, current_script: &[Step]) -> Result<ProposedChange, QaError>;
}

/// A minimal stand-in proposer with no model behind it: appends a
/// `WAIT_FOR_LOAD` step, the single most common manual fix for a
/// timing-flaky UI test. Useful for wiring smoke tests and the CLI
/// where a real proposer (LLM-backed or heuristic-backed) isn't wired
/// up; real deployments should supply their own `ChangeProposer`.
pub struct WaitInjectionProposer {
    pub cost: u64,
}

impl Default for WaitInjectionProposer {
    fn default() -> Self {
        Self { cost: 1 }
    }
}

impl ChangeProposer for WaitInjectionProposer {
    fn propose(&self, _test_name: &str, current_script: &[Step]) -> Result<ProposedChange, QaError> {
        let mut script = current_script.to_vec();
        script.push(Step {
            action: "WAIT_FOR_LOAD".to_string(),
            locator: None,
            value: None,
            timeout_ms: None,
        });
        Ok(ProposedChange {
            script,
            rationale: "inject a WAIT_FOR_LOAD step before the first assertion".to_string(),
            cost: self.cost,
        })
    }
}
