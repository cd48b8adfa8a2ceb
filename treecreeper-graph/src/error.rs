//! Error types for the treecreeper-graph crate.

use crate::node::NodeBuilderError;
use thiserror::Error;

/// Errors related to Graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Node not found: #{0}")]
    NodeNotFound(usize),

    #[error("Link role cannot be empty (from node #{0})")]
    EmptyRole(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Node builder error: {0}")]
    NodeBuilderError(#[from] NodeBuilderError),
}
