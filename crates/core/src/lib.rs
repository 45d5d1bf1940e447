//! # Glue Core
//!
//! Token lifecycle and request pipeline for the Glue JSON:API node.
//!
//! This crate contains:
//! - Port interfaces for the host transport and the workflow host
//! - The shared token cache and the authentication service
//! - Request building, execution and failure classification
//! - Resource services, response shaping and the dispatcher
//!
//! ## Architecture Principles
//! - Only depends on `glue-common` and `glue-domain`
//! - No HTTP client; every request goes through [`ports::HttpTransport`]
//! - Shared state (the token cache) is constructed by the caller and injected

pub mod auth;
pub mod ports;
pub mod request;
pub mod resources;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{AuthService, CacheStats, TokenCache};
pub use ports::{HttpTransport, NodeHost};
pub use request::{RequestBuilder, RequestExecutor};
pub use resources::{ItemParams, OutputOptions, ResourceFactory};
