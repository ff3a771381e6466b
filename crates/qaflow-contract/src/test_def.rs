use serde::{Deserialize, Serialize};

use qaflow_core::QaError;

use crate::step::Step;

/// A declarative UI test definition (§3 "Test").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestDefinition {
    pub id: String,
    pub name: String,
    pub framework: String,
    pub script: Vec<Step>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub priority: i32,
    /// Opaque per-test notification preferences; the orchestrator never
    /// interprets this payload, it only threads it through to whichever
    /// external notification collaborator the caller wires in (§1).
    #[serde(default)]
    pub notification_preferences: serde_json::Value,
}

fn default_active() -> bool {
    true
}

impl TestDefinition {
    /// Validates a test submission per §6 "create test": a non-empty
    /// name, a non-empty script, and every step's action recognized.
    pub fn validate(&self) -> Result<(), QaError> {
        if self.name.trim().is_empty() {
            return Err(QaError::validation("test name cannot be empty"));
        }
        if self.script.is_empty() {
            return Err(QaError::validation("test script must contain at least one step"));
        }
        for (index, step) in self.script.iter().enumerate() {
            step.parsed_action().map_err(|_| {
                QaError::validation(format!(
                    "step {} has unrecognized action '{}'",
                    index, step.action
                ))
            })?;
        }
        Ok(())
    }
}
