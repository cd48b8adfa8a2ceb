//! HostGraph - the arena holding one compilation's node graph.

use crate::error::GraphError;
use crate::host::Host;
use crate::link::{Link, LinkRecord, roles};
use crate::node::{Node, NodeKind};
use crate::preprocessor::{IncludeEvent, MacroDefinition};
use chrono::{DateTime, Utc};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Handle to one node of a [`HostGraph`].
///
/// Handles are stable for the graph's lifetime; nodes are never removed.
pub type NodeRef = NodeIndex;

/// Identity of the compiler that produced a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub revision: String,

    #[serde(default)]
    pub build_date: String,
}

/// Metadata about the graph itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// Treecreeper version that captured this graph
    pub treecreeper_version: String,

    /// When the graph was captured
    pub captured_at: DateTime<Utc>,

    /// Compiler the graph came from
    #[serde(default)]
    pub compiler: CompilerInfo,

    /// Errors and sorry-messages the compiler reported for this input
    #[serde(default)]
    pub error_count: u32,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self {
            treecreeper_version: env!("CARGO_PKG_VERSION").to_string(),
            captured_at: Utc::now(),
            compiler: CompilerInfo::default(),
            error_count: 0,
        }
    }
}

/// JSON-serializable representation of the graph.
///
/// Node handles are stored as indices into `nodes`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub metadata: GraphMetadata,

    pub nodes: Vec<Node>,

    #[serde(default)]
    pub links: Vec<LinkRecord>,

    #[serde(default)]
    pub roots: Vec<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_scope: Option<usize>,

    #[serde(default)]
    pub discovered: Vec<usize>,

    #[serde(default)]
    pub macros: Vec<MacroDefinition>,

    #[serde(default)]
    pub includes: Vec<IncludeEvent>,
}

/// The node arena for one compilation.
pub struct HostGraph {
    /// Underlying directed graph from petgraph
    inner: DiGraph<Node, Link>,

    /// Compilation units, in host order
    roots: Vec<NodeRef>,

    global_scope: Option<NodeRef>,

    /// Nodes reported through per-declaration callbacks
    discovered: Vec<NodeRef>,

    macros: Vec<MacroDefinition>,

    includes: Vec<IncludeEvent>,

    /// Graph metadata
    pub metadata: GraphMetadata,
}

impl Default for HostGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl HostGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            inner: DiGraph::new(),
            roots: Vec::new(),
            global_scope: None,
            discovered: Vec::new(),
            macros: Vec::new(),
            includes: Vec::new(),
            metadata: GraphMetadata::default(),
        }
    }

    // === Node Operations ===

    /// Add a node to the arena.
    pub fn add_node(&mut self, node: Node) -> NodeRef {
        self.inner.add_node(node)
    }

    /// Check if a handle belongs to this graph.
    pub fn contains(&self, node: NodeRef) -> bool {
        node.index() < self.inner.node_count()
    }

    /// Get a node by handle.
    pub fn node(&self, node: NodeRef) -> Result<&Node, GraphError> {
        self.inner
            .node_weight(node)
            .ok_or(GraphError::NodeNotFound(node.index()))
    }

    /// Get a node's kind tag.
    pub fn kind(&self, node: NodeRef) -> Result<NodeKind, GraphError> {
        self.node(node).map(|n| n.kind)
    }

    /// Get count of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.inner
            .node_indices()
            .map(move |idx| (idx, &self.inner[idx]))
    }

    /// Best-effort name for a node.
    ///
    /// Uses the node's own name, then its `name` link, then the name of its
    /// `declaration` link (a type named through a type declaration).
    pub fn display_name(&self, node: NodeRef) -> Option<&str> {
        let weight = self.inner.node_weight(node)?;
        if let Some(name) = weight.name.as_deref() {
            return Some(name);
        }
        if let Some(id) = self.link(node, roles::NAME) {
            return self.inner.node_weight(id)?.name.as_deref();
        }
        let decl = self.link(node, roles::DECLARATION)?;
        let decl_weight = self.inner.node_weight(decl)?;
        if let Some(name) = decl_weight.name.as_deref() {
            return Some(name);
        }
        let id = self.link(decl, roles::NAME)?;
        self.inner.node_weight(id)?.name.as_deref()
    }

    // === Link Operations ===

    /// Append a link from `source` to `target` under `role`.
    ///
    /// The link is placed after any existing links of the same role.
    pub fn add_link(
        &mut self,
        source: NodeRef,
        target: NodeRef,
        role: &str,
    ) -> Result<(), GraphError> {
        if !self.contains(source) {
            return Err(GraphError::NodeNotFound(source.index()));
        }
        if !self.contains(target) {
            return Err(GraphError::NodeNotFound(target.index()));
        }
        if role.is_empty() {
            return Err(GraphError::EmptyRole(source.index()));
        }

        let position = self
            .inner
            .edges_directed(source, Direction::Outgoing)
            .filter(|edge| edge.weight().role == role)
            .count() as u32;
        self.inner.add_edge(source, target, Link::new(role, position));
        Ok(())
    }

    /// First link of `role` from `node`, if any.
    pub fn link(&self, node: NodeRef, role: &str) -> Option<NodeRef> {
        self.inner
            .edges_directed(node, Direction::Outgoing)
            .filter(|edge| edge.weight().role == role)
            .min_by_key(|edge| edge.weight().position)
            .map(|edge| edge.target())
    }

    /// All links of `role` from `node`, in position order.
    pub fn links(&self, node: NodeRef, role: &str) -> Vec<NodeRef> {
        let mut found: Vec<(u32, NodeRef)> = self
            .inner
            .edges_directed(node, Direction::Outgoing)
            .filter(|edge| edge.weight().role == role)
            .map(|edge| (edge.weight().position, edge.target()))
            .collect();
        found.sort_by_key(|(position, _)| *position);
        found.into_iter().map(|(_, target)| target).collect()
    }

    /// Check if `node` has at least one link of `role`.
    pub fn has_link(&self, node: NodeRef, role: &str) -> bool {
        self.link(node, role).is_some()
    }

    /// Get count of links.
    pub fn link_count(&self) -> usize {
        self.inner.edge_count()
    }

    // === Compilation Operations ===

    /// Register a compilation-unit root.
    pub fn add_root(&mut self, node: NodeRef) -> Result<(), GraphError> {
        if !self.contains(node) {
            return Err(GraphError::NodeNotFound(node.index()));
        }
        self.roots.push(node);
        Ok(())
    }

    /// Set the global scope node.
    pub fn set_global_scope(&mut self, node: NodeRef) -> Result<(), GraphError> {
        if !self.contains(node) {
            return Err(GraphError::NodeNotFound(node.index()));
        }
        self.global_scope = Some(node);
        Ok(())
    }

    /// Record a node reported by a per-declaration callback.
    pub fn add_discovered(&mut self, node: NodeRef) -> Result<(), GraphError> {
        if !self.contains(node) {
            return Err(GraphError::NodeNotFound(node.index()));
        }
        self.discovered.push(node);
        Ok(())
    }

    pub fn add_macro(&mut self, definition: MacroDefinition) {
        self.macros.push(definition);
    }

    pub fn add_include_event(&mut self, event: IncludeEvent) {
        self.includes.push(event);
    }

    /// Add to the number of errors the compiler reported.
    pub fn record_errors(&mut self, count: u32) {
        self.metadata.error_count += count;
    }

    pub fn roots(&self) -> &[NodeRef] {
        &self.roots
    }

    pub fn global_scope(&self) -> Option<NodeRef> {
        self.global_scope
    }

    pub fn macros(&self) -> &[MacroDefinition] {
        &self.macros
    }

    pub fn include_events(&self) -> &[IncludeEvent] {
        &self.includes
    }

    // === Serialization ===

    fn to_snapshot(&self) -> GraphSnapshot {
        let mut edges: Vec<_> = self.inner.edge_references().collect();
        edges.sort_by(|a, b| {
            (a.source().index(), &a.weight().role, a.weight().position).cmp(&(
                b.source().index(),
                &b.weight().role,
                b.weight().position,
            ))
        });

        GraphSnapshot {
            metadata: self.metadata.clone(),
            nodes: self.inner.node_weights().cloned().collect(),
            links: edges
                .into_iter()
                .map(|edge| LinkRecord {
                    source: edge.source().index(),
                    target: edge.target().index(),
                    role: edge.weight().role.clone(),
                })
                .collect(),
            roots: self.roots.iter().map(|n| n.index()).collect(),
            global_scope: self.global_scope.map(|n| n.index()),
            discovered: self.discovered.iter().map(|n| n.index()).collect(),
            macros: self.macros.clone(),
            includes: self.includes.clone(),
        }
    }

    fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        graph.metadata = snapshot.metadata;

        // Add all nodes first
        for node in snapshot.nodes {
            graph.add_node(node);
        }

        // Then add all links
        for link in snapshot.links {
            graph.add_link(
                NodeIndex::new(link.source),
                NodeIndex::new(link.target),
                &link.role,
            )?;
        }

        for root in snapshot.roots {
            graph.add_root(NodeIndex::new(root))?;
        }
        if let Some(scope) = snapshot.global_scope {
            graph.set_global_scope(NodeIndex::new(scope))?;
        }
        for node in snapshot.discovered {
            graph.add_discovered(NodeIndex::new(node))?;
        }
        graph.macros = snapshot.macros;
        graph.includes = snapshot.includes;

        Ok(graph)
    }

    /// Serialize the graph to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), GraphError> {
        let file = std::fs::File::create(path.as_ref())?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.to_snapshot())
            .map_err(|e| GraphError::SerializationError(e.to_string()))?;

        Ok(())
    }

    /// Load a graph from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = std::io::BufReader::new(file);
        let snapshot: GraphSnapshot = serde_json::from_reader(reader)
            .map_err(|e| GraphError::DeserializationError(e.to_string()))?;

        Self::from_snapshot(snapshot)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| GraphError::SerializationError(e.to_string()))
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)
            .map_err(|e| GraphError::DeserializationError(e.to_string()))?;

        Self::from_snapshot(snapshot)
    }

    /// Get the internal petgraph for advanced operations.
    pub fn inner(&self) -> &DiGraph<Node, Link> {
        &self.inner
    }
}

impl Host for HostGraph {
    fn graph(&self) -> &HostGraph {
        self
    }

    fn root_nodes(&self) -> Vec<NodeRef> {
        self.roots.iter().copied().chain(self.global_scope).collect()
    }

    fn discovered_nodes(&self) -> Vec<NodeRef> {
        self.discovered.clone()
    }

    fn for_each_macro_definition<E>(
        &self,
        mut callback: impl FnMut(&MacroDefinition) -> Result<(), E>,
    ) -> Result<(), E> {
        self.macros.iter().try_for_each(|definition| callback(definition))
    }

    fn for_each_include_event<E>(
        &self,
        mut callback: impl FnMut(&IncludeEvent) -> Result<(), E>,
    ) -> Result<(), E> {
        self.includes.iter().try_for_each(|event| callback(event))
    }

    fn had_upstream_errors(&self) -> bool {
        self.metadata.error_count > 0
    }

    fn compiler_info(&self) -> &CompilerInfo {
        &self.metadata.compiler
    }
}

impl std::fmt::Debug for HostGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostGraph")
            .field("node_count", &self.node_count())
            .field("link_count", &self.link_count())
            .field("roots", &self.roots.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Location, NodeBuilder};
    use pretty_assertions::assert_eq;

    fn create_node(kind: NodeKind, name: &str) -> Node {
        NodeBuilder::new().kind(kind).name(name).build().unwrap()
    }

    fn create_test_graph() -> (HostGraph, NodeRef, Vec<NodeRef>) {
        let mut graph = HostGraph::new();
        let record = graph.add_node(create_node(NodeKind::RecordType, "point"));
        let fields: Vec<NodeRef> = ["x", "y", "z"]
            .iter()
            .map(|name| graph.add_node(create_node(NodeKind::FieldDecl, name)))
            .collect();
        for field in &fields {
            graph.add_link(record, *field, roles::FIELDS).unwrap();
            graph.add_link(*field, record, roles::FIELD_CONTEXT).unwrap();
        }
        (graph, record, fields)
    }

    #[test]
    fn test_add_and_get_node() {
        let mut graph = HostGraph::new();
        let node = graph.add_node(create_node(NodeKind::VarDecl, "counter"));

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.kind(node).unwrap(), NodeKind::VarDecl);
        assert_eq!(graph.node(node).unwrap().name.as_deref(), Some("counter"));
    }

    #[test]
    fn test_missing_node_error() {
        let graph = HostGraph::new();
        let result = graph.node(NodeIndex::new(7));
        assert!(matches!(result, Err(GraphError::NodeNotFound(7))));
    }

    #[test]
    fn test_links_keep_position_order() {
        let (graph, record, fields) = create_test_graph();

        assert_eq!(graph.links(record, roles::FIELDS), fields);
        assert_eq!(graph.link(record, roles::FIELDS), Some(fields[0]));
        assert_eq!(graph.link(fields[2], roles::FIELD_CONTEXT), Some(record));
        assert!(graph.links(record, roles::METHODS).is_empty());
        assert!(!graph.has_link(record, roles::MAIN_VARIANT));
    }

    #[test]
    fn test_self_link() {
        let mut graph = HostGraph::new();
        let ty = graph.add_node(create_node(NodeKind::IntegerType, "int"));
        graph.add_link(ty, ty, roles::MAIN_VARIANT).unwrap();
        assert_eq!(graph.link(ty, roles::MAIN_VARIANT), Some(ty));
    }

    #[test]
    fn test_add_link_missing_target() {
        let mut graph = HostGraph::new();
        let node = graph.add_node(create_node(NodeKind::VarDecl, "v"));
        let result = graph.add_link(node, NodeIndex::new(9), roles::TYPE);
        assert!(matches!(result, Err(GraphError::NodeNotFound(9))));
    }

    #[test]
    fn test_add_link_empty_role() {
        let mut graph = HostGraph::new();
        let node = graph.add_node(create_node(NodeKind::VarDecl, "v"));
        let result = graph.add_link(node, node, "");
        assert!(matches!(result, Err(GraphError::EmptyRole(0))));
    }

    #[test]
    fn test_display_name_through_declaration() {
        let mut graph = HostGraph::new();
        let ty = graph.add_node(NodeBuilder::new().kind(NodeKind::RecordType).build().unwrap());
        let decl = graph.add_node(NodeBuilder::new().kind(NodeKind::TypeDecl).build().unwrap());
        let id = graph.add_node(create_node(NodeKind::IdentifierNode, "point_t"));
        graph.add_link(ty, decl, roles::DECLARATION).unwrap();
        graph.add_link(decl, id, roles::NAME).unwrap();

        assert_eq!(graph.display_name(decl), Some("point_t"));
        assert_eq!(graph.display_name(ty), Some("point_t"));
        assert_eq!(graph.display_name(id), Some("point_t"));
    }

    #[test]
    fn test_root_nodes_end_with_global_scope() {
        let mut graph = HostGraph::new();
        let unit = graph.add_node(create_node(NodeKind::TranslationUnitDecl, "main.c"));
        let scope = graph.add_node(create_node(NodeKind::NamespaceDecl, "::"));
        graph.add_root(unit).unwrap();
        graph.set_global_scope(scope).unwrap();

        assert_eq!(graph.root_nodes(), vec![unit, scope]);
    }

    #[test]
    fn test_upstream_errors() {
        let mut graph = HostGraph::new();
        assert!(!graph.had_upstream_errors());
        graph.record_errors(2);
        assert!(graph.had_upstream_errors());
    }

    #[test]
    fn test_callbacks_stop_at_first_error() {
        let mut graph = HostGraph::new();
        graph.add_macro(MacroDefinition::object_like("A"));
        graph.add_macro(MacroDefinition::object_like("B"));
        graph.add_macro(MacroDefinition::object_like("C"));

        let mut seen = Vec::new();
        let result: Result<(), String> = graph.for_each_macro_definition(|m| {
            seen.push(m.name.clone());
            if m.name == "B" {
                Err("stop".to_string())
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("stop".to_string()));
        assert_eq!(seen, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_json_roundtrip() {
        let (mut graph, record, fields) = create_test_graph();
        let unit = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::TranslationUnitDecl)
                .location(Location::new("point.c", 0, 0))
                .build()
                .unwrap(),
        );
        graph.add_root(unit).unwrap();
        graph.add_discovered(fields[1]).unwrap();
        graph.add_include_event(IncludeEvent::Enter {
            file: "point.c".to_string(),
            from: None,
        });
        graph.metadata.compiler.name = "GCC".to_string();

        let json = graph.to_json().unwrap();
        let loaded = HostGraph::from_json(&json).unwrap();

        assert_eq!(loaded.node_count(), graph.node_count());
        assert_eq!(loaded.link_count(), graph.link_count());
        assert_eq!(loaded.links(record, roles::FIELDS), fields);
        assert_eq!(loaded.roots(), &[unit]);
        assert_eq!(loaded.discovered_nodes(), vec![fields[1]]);
        assert_eq!(loaded.include_events().len(), 1);
        assert_eq!(loaded.compiler_info().name, "GCC");
    }

    #[test]
    fn test_snapshot_with_bad_link_fails() {
        let json = r#"{
            "metadata": {"treecreeper_version": "0.1.0", "captured_at": "2024-01-15T10:30:00Z"},
            "nodes": [{"kind": "var_decl"}],
            "links": [{"source": 0, "target": 3, "role": "type"}]
        }"#;
        let result = HostGraph::from_json(json);
        assert!(matches!(result, Err(GraphError::NodeNotFound(3))));
    }

    #[test]
    fn test_persistence_roundtrip() {
        let (graph, record, fields) = create_test_graph();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("graph.json");

        graph.save_to_file(&path).unwrap();
        let loaded = HostGraph::load_from_file(&path).unwrap();

        assert_eq!(loaded.links(record, roles::FIELDS), fields);
        assert_eq!(loaded.kind(record).unwrap(), NodeKind::RecordType);
    }

    #[test]
    fn test_unknown_kind_survives_persistence() {
        let mut graph = HostGraph::new();
        let node = graph.add_node(NodeBuilder::new().kind_name("omp_parallel").build().unwrap());

        let loaded = HostGraph::from_json(&graph.to_json().unwrap()).unwrap();
        assert_eq!(loaded.kind(node).unwrap(), NodeKind::Unknown);
        assert_eq!(loaded.node(node).unwrap().kind_name(), "omp_parallel");
    }
}
