//! Shared domain value types for the qaflow QA automation core.
//!
//! These are plain value types carrying only the attributes named in the
//! data model: relations are expressed by id reference, never by lazy
//! ORM-style entity graphs (§9 Design Notes).

pub mod agent;
pub mod event;
pub mod history;
pub mod run;
pub mod schedule;
pub mod step;
pub mod test_def;

pub use agent::{AgentAction, AgentExecution, AgentStatus};
pub use event::TerminalRunEvent;
pub use history::{FailurePattern, QualitySnapshot, RunHistory};
pub use run::{BrowserKind, FailureCategory, Run, RunStatus, TriggeredBy};
pub use schedule::ScheduleEntry;
pub use step::{Locator, LocatorStrategy, Step, StepAction};
pub use test_def::TestDefinition;
