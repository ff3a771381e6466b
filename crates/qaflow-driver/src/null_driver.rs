use async_trait::async_trait;
use qaflow_contract::{BrowserKind, Step};
use qaflow_core::QaError;

use crate::outcome::StepOutcome;
use crate::port::{BrowserDriver, Session};
use crate::timeouts::DriverTimeouts;

/// A `BrowserDriver` that opens every browser kind and executes every
/// step as an immediate success. Useful for exercising the orchestrator
/// wiring without a real browser backend attached.
pub struct NullDriver;

#[async_trait]
impl BrowserDriver for NullDriver {
    async fn open(
        &self,
        browser_kind: BrowserKind,
        headless: bool,
        _timeouts: DriverTimeouts,
    ) -> Result<Box<dyn Session>, QaError> {
        tracing::debug!(?browser_kind, headless, "null driver opening session");
        Ok(Box::new(NullSession))
    }
}

struct NullSession;

#[async_trait]
impl Session for NullSession {
    async fn execute(&mut self, _step: &Step) -> StepOutcome {
        StepOutcome::ok()
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, QaError> {
        Ok(b"null-driver-placeholder-png".to_vec())
    }

    async fn close(&mut self) -> Result<(), QaError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn functional_null_driver_opens_and_executes_every_step_as_success() {
        let driver = NullDriver;
        let mut session = driver
            .open(BrowserKind::Chrome, true, DriverTimeouts::default())
            .await
            .expect("open should succeed");
        let step = Step {
            action: "NAVIGATE".to_string(),
            locator: None,
            value: Some("https://example.com".to_string()),
            timeout_ms: None,
        };
        let outcome = session.execute(&step).await;
        assert!(outcome.success);
        assert!(session.screenshot().await.is_ok());
        assert!(session.close().await.is_ok());
    }
}
