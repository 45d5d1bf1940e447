//! Node-level error

use glue_domain::{ErrorCategory, GlueError};
use thiserror::Error;

/// Failure of one input item, aborting the batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("item {item_index}: {source}")]
pub struct NodeError {
    pub item_index: usize,
    #[source]
    pub source: GlueError,
}

impl NodeError {
    pub fn new(item_index: usize, source: GlueError) -> Self {
        Self { item_index, source }
    }

    pub fn category(&self) -> ErrorCategory {
        self.source.category()
    }
}
