use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use qaflow_contract::{BrowserKind, Step};
use qaflow_core::QaError;

use crate::outcome::StepOutcome;
use crate::port::{BrowserDriver, Session};
use crate::timeouts::DriverTimeouts;

/// Deterministic test double that replays a fixed sequence of
/// `StepOutcome`s, generalized from the fixture-replay pattern of
/// `browser_automation_contract` (per-case expected outcome there, one
/// scripted outcome per step here).
///
/// Each call to `open` starts a fresh session reading from the same
/// scripted sequence; once the sequence is exhausted every further
/// `execute` call returns success.
pub struct ScriptedDriver {
    script: Vec<StepOutcome>,
    refuse_kind: Option<BrowserKind>,
}

impl ScriptedDriver {
    pub fn new(script: Vec<StepOutcome>) -> Self {
        Self {
            script,
            refuse_kind: None,
        }
    }

    /// Configures the driver to refuse `open` for one browser kind,
    /// surfacing a `Validation` error (used to exercise the
    /// driver-setup-failure path of §4.E).
    pub fn refusing(mut self, kind: BrowserKind) -> Self {
        self.refuse_kind = Some(kind);
        self
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn open(
        &self,
        browser_kind: BrowserKind,
        _headless: bool,
        _timeouts: DriverTimeouts,
    ) -> Result<Box<dyn Session>, QaError> {
        if self.refuse_kind == Some(browser_kind) {
            return Err(QaError::validation(format!(
                "scripted driver configured to refuse browser kind {browser_kind:?}"
            )));
        }
        Ok(Box::new(ScriptedSession {
            remaining: Mutex::new(self.script.clone().into()),
        }))
    }
}

struct ScriptedSession {
    remaining: Mutex<VecDeque<StepOutcome>>,
}

#[async_trait]
impl Session for ScriptedSession {
    async fn execute(&mut self, _step: &Step) -> StepOutcome {
        let mut remaining = self.remaining.lock().expect("scripted session mutex poisoned");
        remaining.pop_front().unwrap_or_else(StepOutcome::ok)
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, QaError> {
        Ok(b"scripted-driver-placeholder-png".to_vec())
    }

    async fn close(&mut self) -> Result<(), QaError> {
        Ok(())
    }
}
