//! History Recorder (§4.G): a bounded channel consumer that appends
//! `RunHistory` rows and clusters `FailurePattern`s, plus an on-demand
//! `QualitySnapshot` builder.

pub mod consumer;
pub mod snapshot;
pub mod store;

pub use consumer::run_history_consumer;
pub use snapshot::build_quality_snapshot;
pub use store::HistoryStore;
