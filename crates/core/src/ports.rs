//! Port interfaces for the host runtime
//!
//! The core never talks to the network or the workflow host directly; both
//! are reached through these traits.

use async_trait::async_trait;
use glue_domain::{Credentials, RequestDescriptor, Result, TransportError};
use serde_json::Value;

/// Generic HTTP transport supplied by the host
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request and return the parsed JSON body.
    ///
    /// An empty body is returned as `Value::Null`. Non-2xx responses and
    /// network failures are reported as [`TransportError`].
    async fn perform(&self, request: RequestDescriptor)
        -> std::result::Result<Value, TransportError>;
}

/// Workflow host: per-item parameters, credentials and batch policy
#[async_trait]
pub trait NodeHost: Send + Sync {
    /// Number of input items in the current execution
    fn item_count(&self) -> usize;

    /// Parameter `name` for item `item_index`, `None` when unset
    fn get_parameter(&self, name: &str, item_index: usize) -> Option<Value>;

    /// Resolve the named credential set
    async fn get_credentials(&self, name: &str) -> Result<Credentials>;

    /// Convert item failures into error records instead of aborting
    fn continue_on_failure(&self) -> bool;
}
