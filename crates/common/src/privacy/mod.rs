//! Privacy helpers
//!
//! Credentials must never reach logs or error text. [`redact`] scrubs header
//! maps before they are handed to `tracing`.

pub mod redact;

pub use redact::{is_sensitive_header, sanitize_headers, REDACTED};
