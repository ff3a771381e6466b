//! Browser Driver Port (§4.B): a narrow capability trait the
//! orchestrator depends on, plus a null implementation for wiring
//! smoke-tests and a scripted implementation for deterministic tests.

pub mod null_driver;
pub mod outcome;
pub mod port;
pub mod scripted_driver;
pub mod timeouts;

pub use null_driver::NullDriver;
pub use outcome::StepOutcome;
pub use port::{BrowserDriver, Session};
pub use scripted_driver::ScriptedDriver;
pub use timeouts::DriverTimeouts;
