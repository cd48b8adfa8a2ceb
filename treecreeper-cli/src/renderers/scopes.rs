//! Renderers for scopes: namespaces and lexical blocks.
//!
//! Scopes list their member declarations in source order rather than in the
//! order the host chained them.

use std::io::Write;

use treecreeper_graph::{NodeRef, roles};

use super::common::begin_node;
use super::declarations::begin_declaration;
use crate::serializers::tracker::OrderKey;
use crate::serializers::{RenderContext, SerializeError};

/// Remember every member of a scope and return them in remembered-set order.
///
/// `filtered` members are dropped when they are built-ins and built-ins are
/// not requested; `kept` members are always included.
fn harvest<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    filtered: Vec<NodeRef>,
    kept: Vec<NodeRef>,
) -> Result<Vec<NodeRef>, SerializeError> {
    let graph = ctx.graph();
    let include_builtins = ctx.options().include_builtins;

    let mut keys = Vec::new();
    for decl in filtered {
        if include_builtins || !graph.node(decl)?.builtin {
            keys.push(OrderKey::of(graph, decl)?);
            ctx.remember(decl)?;
        }
    }
    for decl in kept {
        keys.push(OrderKey::of(graph, decl)?);
        ctx.remember(decl)?;
    }

    keys.sort();
    keys.dedup();
    Ok(keys.iter().map(OrderKey::node).collect())
}

fn write_declarations<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decls: Vec<NodeRef>,
) -> Result<(), SerializeError> {
    ctx.stream().field("declarations")?.begin_array(false)?;
    for decl in decls {
        ctx.render(Some(decl))?;
    }
    ctx.stream().end_array()?;
    Ok(())
}

/// A namespace alias lists no declarations of its own.
pub fn render_namespace<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ns: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    begin_declaration(ctx, ns)?;

    let alias = graph.link(ns, roles::NAMESPACE_ALIAS);
    ctx.render_field("alias for", alias)?;

    if alias.is_some() {
        ctx.stream().field("declarations")?.null()?;
    } else {
        let decls = harvest(
            ctx,
            graph.links(ns, roles::DECLARATIONS),
            graph.links(ns, roles::NAMESPACES),
        )?;
        write_declarations(ctx, decls)?;
    }
    ctx.stream().end_object()?;
    Ok(())
}

pub fn render_block<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    block: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    begin_node(ctx, block)?;

    let decls = harvest(ctx, graph.links(block, roles::DECLARATIONS), Vec::new())?;
    write_declarations(ctx, decls)?;
    ctx.render_link("context", block, roles::SUPERCONTEXT)?;
    ctx.render_links("subblocks", block, roles::SUBBLOCKS, false)?;
    ctx.stream().end_object()?;
    Ok(())
}
