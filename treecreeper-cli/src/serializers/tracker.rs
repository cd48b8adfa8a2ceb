//! Identity and reference tracking for one serialization run.
//!
//! The tracker answers three questions about a node: which id it carries,
//! whether it was already written in full, and which discovered nodes are
//! still waiting to be written.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use treecreeper_graph::{GraphError, HostGraph, Location, NodeKind, NodeRef, roles};

/// Document-wide node identity. Allocated in discovery order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a node in the remembered set.
///
/// Declarations with a source location come first, ordered by location;
/// everything else follows in arena order. The arena index breaks ties so
/// that distinct nodes never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderKey {
    Located(Location, usize),
    Unlocated(usize),
}

impl OrderKey {
    pub fn of(graph: &HostGraph, node: NodeRef) -> Result<Self, GraphError> {
        let weight = graph.node(node)?;
        Ok(match &weight.location {
            Some(location) if weight.kind.is_declaration() => {
                OrderKey::Located(location.clone(), node.index())
            }
            _ => OrderKey::Unlocated(node.index()),
        })
    }

    pub fn node(&self) -> NodeRef {
        match self {
            OrderKey::Located(_, index) | OrderKey::Unlocated(index) => NodeRef::new(*index),
        }
    }
}

/// An enumeration entry with no matching constant declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    /// The enumeration type that was searched
    pub owner: NodeRef,

    /// The value-list entry being resolved
    pub key: NodeRef,
}

/// Kinds that are always written inline, however often they are reached.
fn is_never_shared(kind: NodeKind) -> bool {
    kind == NodeKind::IdentifierNode
}

/// Run-scoped identity map, visited set and remembered set.
#[derive(Debug)]
pub struct Tracker {
    ids: HashMap<NodeRef, NodeId>,
    next_id: u64,
    visited: HashSet<NodeRef>,
    remembered: BTreeSet<OrderKey>,
    remembered_nodes: HashSet<NodeRef>,
    /// Enumeration constant declarations keyed by their owning type
    constants: HashMap<NodeRef, Vec<NodeRef>>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: 1,
            visited: HashSet::new(),
            remembered: BTreeSet::new(),
            remembered_nodes: HashSet::new(),
            constants: HashMap::new(),
        }
    }

    /// Id of `node`, allocating the next one on first sight.
    pub fn id_of(&mut self, graph: &HostGraph, node: NodeRef) -> Result<NodeId, GraphError> {
        if let Some(id) = self.ids.get(&node) {
            return Ok(*id);
        }
        self.remember(graph, node)?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.ids.insert(node, id);
        Ok(id)
    }

    /// Id of `node` if one was already allocated.
    pub fn existing_id(&self, node: NodeRef) -> Option<NodeId> {
        self.ids.get(&node).copied()
    }

    /// Add `node` to the remembered set. Repeated calls have no further effect.
    ///
    /// Constant declarations are also indexed under their type for
    /// [`Tracker::find_related_constant`].
    pub fn remember(&mut self, graph: &HostGraph, node: NodeRef) -> Result<(), GraphError> {
        if self.remembered_nodes.contains(&node) {
            return Ok(());
        }
        let key = OrderKey::of(graph, node)?;
        if graph.kind(node)? == NodeKind::ConstDecl {
            if let Some(owner) = graph.link(node, roles::TYPE) {
                self.constants.entry(owner).or_default().push(node);
            }
        }
        self.remembered.insert(key);
        self.remembered_nodes.insert(node);
        Ok(())
    }

    pub fn is_remembered(&self, node: NodeRef) -> bool {
        self.remembered_nodes.contains(&node)
    }

    /// Whether a node of `kind` should be written as a reference stub.
    pub fn should_reference(&self, kind: NodeKind, node: NodeRef) -> bool {
        !is_never_shared(kind) && self.visited.contains(&node)
    }

    pub fn mark_visited(&mut self, node: NodeRef) {
        self.visited.insert(node);
    }

    pub fn is_visited(&self, node: NodeRef) -> bool {
        self.visited.contains(&node)
    }

    /// Remembered nodes not yet written in full, in remembered-set order.
    pub fn pending(&self) -> Vec<NodeRef> {
        self.remembered
            .iter()
            .map(OrderKey::node)
            .filter(|node| !self.visited.contains(node))
            .collect()
    }

    pub fn ids_allocated(&self) -> u64 {
        self.next_id - 1
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Resolve an enumeration value-list entry to its constant declaration.
    ///
    /// A declaration matches when its name is the entry's purpose and its
    /// initial value is the entry's value, both by identity. Constant
    /// declarations only hang off the main variant of a type, so a miss on
    /// a variant is retried once on its main variant.
    pub fn find_related_constant(
        &self,
        graph: &HostGraph,
        owner: NodeRef,
        entry: NodeRef,
    ) -> Result<NodeRef, LookupFailure> {
        let name = graph.link(entry, roles::PURPOSE);
        let value = graph.link(entry, roles::VALUE);

        let search = |ty: NodeRef| {
            self.constants.get(&ty).and_then(|decls| {
                decls.iter().copied().find(|decl| {
                    graph.link(*decl, roles::NAME) == name
                        && graph.link(*decl, roles::INITIAL) == value
                })
            })
        };

        if let Some(decl) = search(owner) {
            return Ok(decl);
        }
        match graph.link(owner, roles::MAIN_VARIANT) {
            Some(main) if main != owner => search(main),
            _ => None,
        }
        .ok_or(LookupFailure { owner, key: entry })
    }
}
