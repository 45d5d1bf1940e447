//! # Glue Node
//!
//! Workflow-node entry point for the Glue JSON:API.
//!
//! This crate contains:
//! - [`GlueNode`]: runs one (resource, operation) dispatch per input item
//! - [`NodeContext`]: composition root owning the shared token cache
//! - The static node description used by hosts
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Wires `glue-core` services to the `glue-infra` transport and config
//! - Hosts supply parameters and credentials through
//!   [`glue_core::NodeHost`]

pub mod context;
pub mod description;
pub mod error;
pub mod logging;
pub mod node;

pub use context::NodeContext;
pub use description::{describe, NodeDescription};
pub use error::NodeError;
pub use logging::{init_tracing, LogFormat};
pub use node::{GlueNode, NodeOutput};
