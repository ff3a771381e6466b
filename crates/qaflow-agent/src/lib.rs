//! Autonomous Fix Agent (§4.I): a bounded iteration loop that proposes
//! a change to a flaky test, applies it, verifies it via N sequential
//! runs through the Orchestrator, and reverts on failure.

pub mod agent;
pub mod config;
pub mod history_source;
pub mod proposer;

pub use agent::FixAgent;
pub use config::AgentConfig;
pub use history_source::HistorySource;
pub use proposer::{ChangeProposer, ProposedChange, WaitInjectionProposer};
