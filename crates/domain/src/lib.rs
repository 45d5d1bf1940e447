//! # Glue Domain
//!
//! Domain types for the Glue JSON:API workflow node.
//!
//! This crate contains:
//! - Credentials, cached tokens and token grants
//! - Request descriptors and transport failures (the host contract)
//! - Resource / operation identifiers and output records
//! - Error types and the `Result` alias
//! - Client configuration and constants
//!
//! ## Architecture
//! - No dependencies on other Glue crates
//! - No I/O; pure data and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
