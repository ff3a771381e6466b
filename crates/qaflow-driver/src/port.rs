use async_trait::async_trait;
use qaflow_contract::{BrowserKind, Step};
use qaflow_core::QaError;

use crate::outcome::StepOutcome;
use crate::timeouts::DriverTimeouts;

/// One live browser session opened through a `BrowserDriver` (§4.B).
#[async_trait]
pub trait Session: Send {
    async fn execute(&mut self, step: &Step) -> StepOutcome;
    async fn screenshot(&mut self) -> Result<Vec<u8>, QaError>;
    async fn close(&mut self) -> Result<(), QaError>;
}

/// Narrow capability the orchestrator depends on to run a test script
/// against a real or fake browser backend. Platform-specific launch
/// arguments (sandbox/GPU flags, binary discovery) live entirely behind
/// this port; the orchestrator is platform-agnostic (§4.B).
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn open(
        &self,
        browser_kind: BrowserKind,
        headless: bool,
        timeouts: DriverTimeouts,
    ) -> Result<Box<dyn Session>, QaError>;
}
