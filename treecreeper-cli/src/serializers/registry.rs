//! Kind-to-renderer dispatch table.

use std::collections::HashMap;
use std::io::Write;

use treecreeper_graph::{NodeKind, NodeRef};

use super::context::RenderContext;
use super::error::SerializeError;
use crate::renderers;

/// Writes exactly one complete JSON value for `node`.
///
/// A renderer is only called for a node's first full rendering; identity and
/// reference stubs are handled before it runs. Children must go through
/// [`RenderContext::render`] so they get the same treatment.
pub type Renderer<W> = fn(&mut RenderContext<'_, W>, NodeRef) -> Result<(), SerializeError>;

/// Read-only mapping from node kind to renderer, built once per run.
pub struct Registry<W: Write> {
    renderers: HashMap<NodeKind, Renderer<W>>,
}

impl<W: Write> Default for Registry<W> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<W: Write> Registry<W> {
    /// A registry with no renderers; every node renders as unsupported.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// A registry with renderers for every kind this build understands.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        renderers::register_all(&mut registry);
        registry
    }

    /// Install `renderer` for `kind`, returning the one it replaced.
    pub fn register(&mut self, kind: NodeKind, renderer: Renderer<W>) -> Option<Renderer<W>> {
        self.renderers.insert(kind, renderer)
    }

    pub fn lookup(&self, kind: NodeKind) -> Option<Renderer<W>> {
        self.renderers.get(&kind).copied()
    }

    pub fn supports(&self, kind: NodeKind) -> bool {
        self.renderers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestRegistry = Registry<Vec<u8>>;

    fn write_marker(
        ctx: &mut RenderContext<'_, Vec<u8>>,
        _node: NodeRef,
    ) -> Result<(), SerializeError> {
        ctx.stream().string("marker")?;
        Ok(())
    }

    #[test]
    fn test_standard_covers_declarations_and_types() {
        let registry = TestRegistry::standard();
        for kind in [
            NodeKind::ConstDecl,
            NodeKind::FieldDecl,
            NodeKind::FunctionDecl,
            NodeKind::NamespaceDecl,
            NodeKind::ParmDecl,
            NodeKind::ResultDecl,
            NodeKind::TemplateDecl,
            NodeKind::TranslationUnitDecl,
            NodeKind::TypeDecl,
            NodeKind::VarDecl,
            NodeKind::ArrayType,
            NodeKind::EnumeralType,
            NodeKind::MethodType,
            NodeKind::NullptrType,
            NodeKind::QualUnionType,
            NodeKind::VectorType,
            NodeKind::StringCst,
            NodeKind::VectorCst,
            NodeKind::Block,
            NodeKind::IdentifierNode,
        ] {
            assert!(registry.supports(kind), "{kind} should be supported");
        }
    }

    #[test]
    fn test_standard_leaves_structural_kinds_unsupported() {
        let registry = TestRegistry::standard();
        for kind in [
            NodeKind::LabelDecl,
            NodeKind::TreeList,
            NodeKind::TreeVec,
            NodeKind::StatementList,
            NodeKind::CallExpr,
            NodeKind::Unknown,
        ] {
            assert!(registry.lookup(kind).is_none(), "{kind} should fall back");
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TestRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.register(NodeKind::VoidType, write_marker).is_none());
        assert!(registry.register(NodeKind::VoidType, write_marker).is_some());
        assert_eq!(registry.len(), 1);
    }
}
