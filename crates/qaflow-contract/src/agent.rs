use serde::{Deserialize, Serialize};

/// Lifecycle status of an `AgentExecution` (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Running,
    Waiting,
    Succeeded,
    Failed,
    Stopped,
    Timeout,
    BudgetExceeded,
}

impl AgentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running | Self::Waiting)
    }
}

/// One entry in an `AgentExecution`'s append-only action log (§3, §4.I).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentAction {
    pub iteration: u32,
    pub kind: String,
    pub input: String,
    pub output: Option<String>,
    pub error: Option<String>,
    pub cost: u64,
    pub ts_unix_ms: u64,
}

/// A bounded-iteration run of the Fix Agent (§3 "AgentExecution").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentExecution {
    pub id: String,
    pub agent_kind: String,
    pub status: AgentStatus,
    pub goal: String,
    pub current_iter: u32,
    pub max_iter: u32,
    pub started_at_unix_ms: u64,
    pub completed_at_unix_ms: Option<u64>,
    pub total_cost: u64,
    pub action_log: Vec<AgentAction>,
}

impl AgentExecution {
    pub fn new(id: String, agent_kind: String, goal: String, max_iter: u32, started_at_unix_ms: u64) -> Self {
        Self {
            id,
            agent_kind,
            status: AgentStatus::Running,
            goal,
            current_iter: 0,
            max_iter,
            started_at_unix_ms,
            completed_at_unix_ms: None,
            total_cost: 0,
            action_log: Vec::new(),
        }
    }

    /// Appends an action and, if `status` is terminal, stamps
    /// `completed_at` so the invariant "completed_at present iff
    /// terminal" always holds together (§3).
    pub fn complete(&mut self, status: AgentStatus, completed_at_unix_ms: u64) {
        self.status = status;
        if status.is_terminal() {
            self.completed_at_unix_ms = Some(completed_at_unix_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_agent_status_terminal_classification() {
        assert!(!AgentStatus::Running.is_terminal());
        assert!(!AgentStatus::Waiting.is_terminal());
        assert!(AgentStatus::Succeeded.is_terminal());
        assert!(AgentStatus::Stopped.is_terminal());
        assert!(AgentStatus::Timeout.is_terminal());
        assert!(AgentStatus::BudgetExceeded.is_terminal());
    }

    #[test]
    fn unit_complete_stamps_completed_at_only_for_terminal_status() {
        let mut execution = AgentExecution::new(
            "a1".to_string(),
            "flaky-fixer".to_string(),
            "stabilize test T".to_string(),
            10,
            1_000,
        );
        execution.complete(AgentStatus::Succeeded, 5_000);
        assert_eq!(execution.completed_at_unix_ms, Some(5_000));
        assert_eq!(execution.status, AgentStatus::Succeeded);
    }
}
