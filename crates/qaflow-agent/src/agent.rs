use std::time::Duration;

use qaflow_contract::{AgentAction, AgentExecution, AgentStatus, RunStatus};
use qaflow_core::{current_unix_timestamp_ms, generate_id, CancellationToken};
use qaflow_orchestrator::{Orchestrator, RunOptions};

use crate::config::AgentConfig;
use crate::history_source::HistorySource;
use crate::proposer::ChangeProposer;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// The Autonomous Fix Agent (§4.I): a bounded iteration loop over a
/// single `AgentExecution`, coupling the Flakiness Analyzer (step 1),
/// a pluggable `ChangeProposer` (step 2), the Orchestrator's
/// write-through and `submit`/`get` (steps 3-4), and a stop flag that
/// is the agent-level analogue of the orchestrator's per-run
/// cancellation token (§5).
pub struct FixAgent {
    orchestrator: Orchestrator,
    history: Box<dyn HistorySource>,
    proposer: Box<dyn ChangeProposer>,
    config: AgentConfig,
}

impl FixAgent {
    pub fn new(
        orchestrator: Orchestrator,
        history: Box<dyn HistorySource>,
        proposer: Box<dyn ChangeProposer>,
        config: AgentConfig,
    ) -> Self {
        Self {
            orchestrator,
            history,
            proposer,
            config,
        }
    }

    /// Runs the agent to completion against `test_id`, whose human
    /// name is `test_name` (used to query the history window). `stop`
    /// is checked between iterations and between verification runs;
    /// it never interrupts an in-flight proposer call or step.
    pub async fn run(&self, test_id: &str, test_name: &str, stop: CancellationToken) -> AgentExecution {
        let started_at = current_unix_timestamp_ms();
        let deadline_at = started_at.saturating_add(self.config.deadline_ms);
        let mut execution = AgentExecution::new(
            generate_id("agent"),
            "flaky-fixer".to_string(),
            format!("stabilize test {test_id}"),
            self.config.max_iter,
            started_at,
        );

        for iteration in 1..=self.config.max_iter {
            execution.current_iter = iteration;

            if stop.is_cancelled() {
                execution.complete(AgentStatus::Stopped, current_unix_timestamp_ms());
                return execution;
            }
            if current_unix_timestamp_ms() >= deadline_at {
                execution.complete(AgentStatus::Timeout, current_unix_timestamp_ms());
                return execution;
            }

            let recent = self.history.recent_history(test_name);
            let still_flaky = qaflow_flaky::flaky(&recent)
                .iter()
                .any(|view| view.test_name == test_name);
            record(
                &mut execution,
                iteration,
                "confirm_flaky",
                test_name,
                Some(still_flaky.to_string()),
                None,
                0,
            );
            if !still_flaky {
                execution.complete(AgentStatus::Succeeded, current_unix_timestamp_ms());
                return execution;
            }

            let Some(test) = self.orchestrator.get_test(test_id) else {
                record(
                    &mut execution,
                    iteration,
                    "propose",
                    test_id,
                    None,
                    Some("test no longer exists".to_string()),
                    0,
                );
                execution.complete(AgentStatus::Failed, current_unix_timestamp_ms());
                return execution;
            };

            if execution.total_cost >= self.config.budget {
                execution.complete(AgentStatus::BudgetExceeded, current_unix_timestamp_ms());
                return execution;
            }

            let change = match self.proposer.propose(test_name, &test.script) {
                Ok(change) => change,
                Err(error) => {
                    record(
                        &mut execution,
                        iteration,
                        "propose",
                        test_name,
                        None,
                        Some(error.to_string()),
                        0,
                    );
                    execution.complete(AgentStatus::Failed, current_unix_timestamp_ms());
                    return execution;
                }
            };

            if execution.total_cost.saturating_add(change.cost) > self.config.budget {
                execution.complete(AgentStatus::BudgetExceeded, current_unix_timestamp_ms());
                return execution;
            }
            execution.total_cost += change.cost;
            record(
                &mut execution,
                iteration,
                "propose",
                test_name,
                Some(change.rationale.clone()),
                None,
                change.cost,
            );

            let previous_script = test.script.clone();
            if let Err(error) = self.orchestrator.update_test_script(test_id, change.script.clone()) {
                record(
                    &mut execution,
                    iteration,
                    "apply",
                    test_id,
                    None,
                    Some(error.to_string()),
                    0,
                );
                execution.complete(AgentStatus::Failed, current_unix_timestamp_ms());
                return execution;
            }
            record(&mut execution, iteration, "apply", test_id, Some("change applied".to_string()), None, 0);

            let verdict = self.verify(test_id, &stop).await;
            record(
                &mut execution,
                iteration,
                "verify",
                test_id,
                Some(format!("{verdict:?}")),
                None,
                0,
            );

            match verdict {
                VerificationVerdict::Stable => {
                    execution.complete(AgentStatus::Succeeded, current_unix_timestamp_ms());
                    return execution;
                }
                VerificationVerdict::Stopped => {
                    let _ = self.orchestrator.update_test_script(test_id, previous_script);
                    execution.complete(AgentStatus::Stopped, current_unix_timestamp_ms());
                    return execution;
                }
                VerificationVerdict::Unstable => {
                    if let Err(error) = self.orchestrator.update_test_script(test_id, previous_script) {
                        record(
                            &mut execution,
                            iteration,
                            "revert",
                            test_id,
                            None,
                            Some(error.to_string()),
                            0,
                        );
                        execution.complete(AgentStatus::Failed, current_unix_timestamp_ms());
                        return execution;
                    }
                    record(&mut execution, iteration, "revert", test_id, Some("reverted".to_string()), None, 0);
                }
            }
        }

        execution.complete(AgentStatus::Failed, current_unix_timestamp_ms());
        execution
    }

    /// Runs `test_id` `verification_runs` times sequentially (§4.I step
    /// 4), checking the stop flag between runs. A stop cancels the
    /// in-flight run through the orchestrator's cancellation token
    /// rather than abandoning it (§5).
    async fn verify(&self, test_id: &str, stop: &CancellationToken) -> VerificationVerdict {
        for _ in 0..self.config.verification_runs {
            if stop.is_cancelled() {
                return VerificationVerdict::Stopped;
            }

            let run_id = match self.orchestrator.submit(test_id, RunOptions {
                triggered_by: qaflow_contract::TriggeredBy::Agent,
                ..RunOptions::default()
            }) {
                Ok(run_id) => run_id,
                Err(_) => return VerificationVerdict::Unstable,
            };

            let status = self.wait_for_terminal(&run_id, stop).await;
            if stop.is_cancelled() {
                let _ = self.orchestrator.cancel(&run_id);
                return VerificationVerdict::Stopped;
            }
            if status != RunStatus::Passed {
                return VerificationVerdict::Unstable;
            }
        }
        VerificationVerdict::Stable
    }

    async fn wait_for_terminal(&self, run_id: &str, stop: &CancellationToken) -> RunStatus {
        loop {
            match self.orchestrator.get(run_id) {
                Ok(run) if run.status.is_terminal() => return run.status,
                Ok(_) => {}
                Err(_) => return RunStatus::Error,
            }
            if stop.is_cancelled() {
                return RunStatus::Error;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerificationVerdict {
    Stable,
    Unstable,
    Stopped,
}

fn record(
    execution: &mut AgentExecution,
    iteration: u32,
    kind: &str,
    input: &str,
    output: Option<String>,
    error: Option<String>,
    cost: u64,
) {
    execution.action_log.push(AgentAction {
        iteration,
        kind: kind.to_string(),
        input: input.to_string(),
        output,
        error,
        cost,
        ts_unix_ms: current_unix_timestamp_ms(),
    });
}
