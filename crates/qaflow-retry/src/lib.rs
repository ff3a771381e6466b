//! Retry Engine (§4.D): retries a whole operation, not a single step,
//! with truncated exponential backoff and cooperative cancellation.

pub mod engine;
pub mod policy;
pub mod result;

pub use engine::run;
pub use policy::RetryPolicy;
pub use result::{AttemptFailure, OpFailure, RetryResult};
