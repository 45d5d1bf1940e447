//! Token cache and authentication service

pub mod cache;
pub mod service;

pub use cache::{CacheStats, TokenCache};
pub use service::{validate_credentials, AuthService};
