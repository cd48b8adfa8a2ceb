//! # treecreeper-graph
//!
//! Host graph data structures for Treecreeper.
//!
//! A compiler's internal syntax/type graph is cyclic and heavily shared: a
//! type is reachable from every declaration that uses it, a type's main
//! variant points back at itself, enumeration constants are reachable both
//! from their type and from the enclosing scope. This crate stores such a
//! graph as an arena:
//!
//! - **Nodes**: a [`NodeKind`] tag plus scalar attributes
//! - **Links**: ordered, role-labelled edges to child nodes
//! - **HostGraph**: the arena, compilation roots, preprocessor records and
//!   JSON persistence
//! - **Host**: the interface the serializer consumes
//!
//! ## Example
//!
//! ```rust
//! use treecreeper_graph::{HostGraph, NodeBuilder, NodeKind, Location, roles};
//!
//! let mut graph = HostGraph::new();
//!
//! let int_type = graph.add_node(
//!     NodeBuilder::new()
//!         .kind(NodeKind::IntegerType)
//!         .name("int")
//!         .attribute("precision", 32)
//!         .build()
//!         .unwrap(),
//! );
//! graph.add_link(int_type, int_type, roles::MAIN_VARIANT).unwrap();
//!
//! let counter = graph.add_node(
//!     NodeBuilder::new()
//!         .kind(NodeKind::VarDecl)
//!         .location(Location::new("main.c", 3, 5))
//!         .build()
//!         .unwrap(),
//! );
//! graph.add_link(counter, int_type, roles::TYPE).unwrap();
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.link(counter, roles::TYPE), Some(int_type));
//! ```

pub mod error;
pub mod graph;
pub mod host;
pub mod link;
pub mod node;
pub mod preprocessor;

// Re-exports for convenient access
pub use error::GraphError;
pub use graph::{CompilerInfo, GraphMetadata, GraphSnapshot, HostGraph, NodeRef};
pub use host::Host;
pub use link::{Link, LinkRecord, roles};
pub use node::{
    AttributeValue, Location, Node, NodeBuilder, NodeBuilderError, NodeClass, NodeKind,
};
pub use preprocessor::{IncludeEvent, MacroDefinition, MacroToken, TokenFlag};
