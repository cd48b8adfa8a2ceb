//! Errors raised while writing a document.

use thiserror::Error;
use treecreeper_graph::{GraphError, HostGraph, NodeRef};

use super::tracker::LookupFailure;

/// Errors that abort a serialization run.
///
/// None of these leave a usable document behind.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("No constant declaration for enumeration entry {key} of {owner}")]
    ConstantNotFound { owner: String, key: String },

    #[error("Malformed {node}: {reason}")]
    MalformedNode { node: String, reason: String },

    #[error("The compiler reported {0} error(s); no output written")]
    UpstreamErrors(u32),
}

impl SerializeError {
    /// Describe a failed constant lookup with the labels of the nodes involved.
    pub fn constant_not_found(graph: &HostGraph, failure: LookupFailure) -> Self {
        let label = |node: NodeRef| {
            graph
                .node(node)
                .map(|n| n.label())
                .unwrap_or_else(|_| format!("#{}", node.index()))
        };
        SerializeError::ConstantNotFound {
            owner: label(failure.owner),
            key: label(failure.key),
        }
    }

    /// A node that violates the shape its kind promises.
    pub fn malformed(graph: &HostGraph, node: NodeRef, reason: impl Into<String>) -> Self {
        SerializeError::MalformedNode {
            node: graph
                .node(node)
                .map(|n| n.label())
                .unwrap_or_else(|_| format!("#{}", node.index())),
            reason: reason.into(),
        }
    }
}
