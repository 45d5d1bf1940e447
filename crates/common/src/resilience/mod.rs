//! Resilience patterns
//!
//! Only the retry loop survives here: token acquisition and resource
//! requests both retry transient failures with exponential backoff, and the
//! callers decide what "transient" means through [`retry::RetryPolicy`].

pub mod retry;

pub use retry::{retry_with_policy, Backoff, RetryDecision, RetryFailure, RetryPolicy};
