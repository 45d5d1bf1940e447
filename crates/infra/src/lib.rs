//! # Glue Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-backed `HttpTransport`
//! - Configuration loading (files and environment)
//!
//! ## Architecture
//! - Implements traits defined in `glue-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod http;

// Re-export commonly used items
pub use http::*;
