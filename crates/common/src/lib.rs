//! Modular common utilities shared across the Glue node crates.
//!
//! # Modules
//!
//! - [`time`]: clock abstraction (real and mock time)
//! - [`resilience`]: exponential backoff and policy-driven retry loops
//! - [`privacy`]: header redaction for anything that ends up in logs
//!
//! # Feature Tiers
//!
//! - `observability`: emit `tracing` events from retry loops (off by default)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod privacy;
pub mod resilience;
pub mod time;

// Re-export commonly used types and traits for convenience
pub use privacy::redact::{sanitize_headers, REDACTED};
pub use resilience::retry::{
    retry_with_policy, Backoff, RetryDecision, RetryFailure, RetryPolicy,
};
pub use time::{Clock, MockClock, SystemClock};
