//! Execution Orchestrator (§4.E): owns the job queue, the worker pool,
//! the run registry, and step execution with retry coupling and
//! artifact capture.

pub mod config;
pub mod job;
pub mod orchestrator;
pub mod registry;
pub mod run_executor;
pub mod view;

pub use config::{QaConfig, QueueConfig, RunConfig, WorkersConfig};
pub use job::{Job, RunOptions};
pub use orchestrator::Orchestrator;
pub use registry::TestRegistry;
pub use run_executor::{execute_run, RunOutcome};
pub use view::{filter_and_page, ListFilter, Paging, RunView};
