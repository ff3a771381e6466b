//! Scheduler (§4.F): cron expression parsing, next-fire computation,
//! overlap prevention, and a catch-up policy, feeding jobs onto the
//! Execution Orchestrator.

pub mod config;
pub mod next_fire;
pub mod registry;
pub mod runtime;

pub use config::SchedulerConfig;
pub use next_fire::{advance, next_fire_unix_ms, validate_cron, ScheduleAdvance};
pub use registry::ScheduleRegistry;
pub use runtime::SchedulerRuntime;
