//! The host collaborator interface.
//!
//! A host is whatever owns the compiler's graph: a live compiler callback,
//! or a snapshot loaded from disk. The serializer only talks to it through
//! this trait.

use crate::graph::{CompilerInfo, HostGraph, NodeRef};
use crate::preprocessor::{IncludeEvent, MacroDefinition};

pub trait Host {
    /// Node arena with per-node field accessors.
    fn graph(&self) -> &HostGraph;

    /// Top-level units followed by the global scope node.
    fn root_nodes(&self) -> Vec<NodeRef>;

    /// Nodes the host reported through per-declaration callbacks.
    ///
    /// These are not necessarily reachable from the roots.
    fn discovered_nodes(&self) -> Vec<NodeRef>;

    /// Push every macro definition to `callback`, stopping at the first error.
    fn for_each_macro_definition<E>(
        &self,
        callback: impl FnMut(&MacroDefinition) -> Result<(), E>,
    ) -> Result<(), E>;

    /// Push every include event to `callback`, stopping at the first error.
    fn for_each_include_event<E>(
        &self,
        callback: impl FnMut(&IncludeEvent) -> Result<(), E>,
    ) -> Result<(), E>;

    /// Whether the host already reported errors for this input.
    fn had_upstream_errors(&self) -> bool;

    /// Identity of the compiler that produced the graph.
    fn compiler_info(&self) -> &CompilerInfo;
}
