//! Flakiness Analyzer (§4.H): pure windowed aggregation over
//! `&[RunHistory]`. No I/O; every function takes data and returns a view.

pub mod aggregate;
pub mod flaky;
pub mod health;
pub mod patterns;
pub mod perf;

pub use aggregate::{group_by_test, StabilityLabel, TestAggregate, MIN_OBS};
pub use flaky::{flaky, FlakyView};
pub use health::{suite_health, SuiteHealth};
pub use patterns::{patterns, PatternView};
pub use perf::{perf, DurationTrend, PerfView};
