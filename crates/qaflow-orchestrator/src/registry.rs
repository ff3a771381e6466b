use std::collections::HashMap;
use std::sync::Mutex;

use qaflow_contract::{Step, TestDefinition};
use qaflow_core::{generate_id, QaError};

/// In-process store of test definitions (§3 "Test"). Creation, lookup,
/// and the active-flag gate that `submit` enforces live here; the
/// orchestrator crate owns this registry since test-authoring HTTP
/// endpoints are out of scope (§1) but `submit` still needs somewhere
/// to resolve a `test_id` into a script.
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: Mutex<HashMap<String, TestDefinition>>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a new test definition, returning its id.
    pub fn create_test(
        &self,
        name: &str,
        framework: &str,
        script: Vec<Step>,
        priority: i32,
        notification_preferences: serde_json::Value,
    ) -> Result<String, QaError> {
        let test = TestDefinition {
            id: generate_id("test"),
            name: name.to_string(),
            framework: framework.to_string(),
            script,
            active: true,
            priority,
            notification_preferences,
        };
        test.validate()?;
        let id = test.id.clone();
        self.tests
            .lock()
            .expect("test registry mutex poisoned")
            .insert(id.clone(), test);
        Ok(id)
    }

    pub fn get(&self, test_id: &str) -> Option<TestDefinition> {
        self.tests
            .lock()
            .expect("test registry mutex poisoned")
            .get(test_id)
            .cloned()
    }

    pub fn set_active(&self, test_id: &str, active: bool) -> Result<(), QaError> {
        let mut tests = self.tests.lock().expect("test registry mutex poisoned");
        let test = tests
            .get_mut(test_id)
            .ok_or_else(|| QaError::not_found(format!("test '{test_id}' not found")))?;
        test.active = active;
        Ok(())
    }

    /// Opaque write-through of a test's script (§4.I step 3 "Apply the
    /// change"); also used to revert a failed fix attempt back to its
    /// prior script.
    pub fn update_script(&self, test_id: &str, script: Vec<Step>) -> Result<(), QaError> {
        let mut tests = self.tests.lock().expect("test registry mutex poisoned");
        let test = tests
            .get_mut(test_id)
            .ok_or_else(|| QaError::not_found(format!("test '{test_id}' not found")))?;
        let candidate = TestDefinition {
            script,
            ..test.clone()
        };
        candidate.validate()?;
        test.script = candidate.script;
        Ok(())
    }
}
