//! Foundational low-level utilities shared across qaflow crates.
//!
//! Provides atomic file-write helpers, time/backoff math, opaque id
//! generation, failure-signature normalization, and the shared `QaError`
//! kind hierarchy used at every component boundary.

pub mod atomic_io;
pub mod cancellation;
pub mod error;
pub mod ids;
pub mod signature;
pub mod time_utils;

pub use atomic_io::{write_bytes_atomic, write_text_atomic};
pub use cancellation::CancellationToken;
pub use error::{QaError, QaResult};
pub use ids::generate_id;
pub use signature::normalize_failure_signature;
pub use time_utils::{backoff_delay_ms, current_unix_timestamp, current_unix_timestamp_ms, is_expired_unix};
