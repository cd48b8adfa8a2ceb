//! Renderers for declaration nodes.

use std::io::Write;

use treecreeper_graph::{NodeKind, NodeRef, roles};

use super::common::{
    begin_node, write_count_attr, write_flag_list, write_integer_attr, write_location,
};
use crate::serializers::{RenderContext, SerializeError};

/// Name the host gives anonymous namespaces; written as `null`.
const ANONYMOUS_NAMESPACE: &str = "_GLOBAL__N_1";

/// Header shared by all declarations.
///
/// Which optional groups appear depends on the declaration kind: sizes for
/// objects, qualifiers for objects and functions, access for everything that
/// can be a class or namespace member, linkage for functions and variables.
pub fn begin_declaration<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    let weight = graph.node(decl)?;
    let kind = weight.kind;

    begin_node(ctx, decl)?;

    let name = graph
        .link(decl, roles::NAME)
        .filter(|id| graph.display_name(*id) != Some(ANONYMOUS_NAMESPACE));
    ctx.render_field("name", name)?;
    ctx.stream()
        .field("language")?
        .string(weight.attr_str("language").unwrap_or("C"))?;

    let is_func = kind == NodeKind::FunctionDecl;
    let is_var = kind == NodeKind::VarDecl;
    let is_parm = kind == NodeKind::ParmDecl;
    let has_size = matches!(
        kind,
        NodeKind::FieldDecl | NodeKind::ParmDecl | NodeKind::ResultDecl | NodeKind::VarDecl
    );
    let has_qualifiers = has_size || is_func;
    let has_access = has_qualifiers
        || matches!(
            kind,
            NodeKind::ConstDecl | NodeKind::TypeDecl | NodeKind::NamespaceDecl
        );

    if is_func || is_var {
        ctx.render_link("assembler name", decl, roles::ASSEMBLER_NAME)?;
    }
    ctx.render_link("context", decl, roles::CONTEXT)?;
    if graph.has_link(decl, roles::ABSTRACT_ORIGIN) {
        ctx.render_link("abstract origin", decl, roles::ABSTRACT_ORIGIN)?;
    }

    let stream = ctx.stream();
    stream.field("artificial")?.bool(weight.flag("artificial"))?;
    stream.field("built-in")?.bool(weight.builtin)?;
    stream.field("location")?;
    write_location(stream, weight.location.as_ref(), weight.builtin)?;

    if has_size {
        stream.field("size")?;
        write_integer_attr(stream, weight, "size")?;
        stream.field("alignment")?;
        write_count_attr(stream, weight, "alignment")?;
    }

    if has_qualifiers {
        let storage = is_func || is_parm || is_var;
        let mut flags: Vec<(&str, &str)> = Vec::new();
        if storage {
            flags.push(("static", "static"));
            flags.push(("extern", "extern"));
        }
        flags.push(("volatile", if is_func { "no-return" } else { "volatile" }));
        if is_func {
            flags.push(("inline", "inline"));
        }
        flags.push(("readonly", "const"));

        stream.field("qualifiers")?;
        write_flag_list(stream, weight, &flags)?;
    }

    if has_access {
        let access = match weight.attr_str("access") {
            Some(access @ ("private" | "protected" | "public")) => access,
            _ => "local",
        };
        stream.field("access")?.string(access)?;
    }

    if is_func || is_var {
        stream.field("weak linkage")?.bool(weight.flag("weak"))?;
        let visibility = match weight.attr_str("visibility") {
            Some(visibility @ ("protected" | "hidden" | "internal")) => visibility,
            _ => "default",
        };
        stream.field("visibility")?.string(visibility)?;
    }
    Ok(())
}

pub fn render_const_decl<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    begin_declaration(ctx, decl)?;
    ctx.render_link("type", decl, roles::TYPE)?;
    ctx.render_link("value", decl, roles::INITIAL)?;
    ctx.stream().end_object()?;
    Ok(())
}

pub fn render_field_decl<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(decl)?;
    begin_declaration(ctx, decl)?;

    ctx.render_link("type", decl, roles::TYPE)?;
    ctx.render_link("declaring class", decl, roles::FIELD_CONTEXT)?;
    ctx.render_link("unit offset", decl, roles::UNIT_OFFSET)?;

    let bit_field = weight.flag("bit-field");
    let stream = ctx.stream();
    stream.field("unit size")?;
    write_count_attr(stream, weight, "offset alignment")?;
    stream.field("bit offset")?;
    write_integer_attr(stream, weight, "bit offset")?;
    stream.field("bit-field")?.bool(bit_field)?;
    if bit_field {
        ctx.render_link("bit-field type", decl, roles::BIT_FIELD_TYPE)?;
    }

    let stream = ctx.stream();
    stream.field("packed")?.bool(weight.flag("packed"))?;
    stream.field("mutable")?.bool(weight.flag("mutable"))?;
    stream.end_object()?;
    Ok(())
}

pub fn render_function_decl<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    let weight = graph.node(decl)?;
    begin_declaration(ctx, decl)?;

    ctx.render_link("function type", decl, roles::TYPE)?;
    ctx.render_link("result", decl, roles::RESULT)?;
    ctx.render_links("arguments", decl, roles::ARGUMENTS, false)?;

    let is_virtual = weight.flag("virtual");
    let stream = ctx.stream();
    stream.field("defined")?.bool(weight.flag("defined"))?;
    stream.field("pure")?.bool(weight.flag("pure"))?;
    stream.field("read globals")?.bool(!weight.flag("novops"))?;
    stream.field("virtual")?.bool(is_virtual)?;
    if is_virtual {
        stream.field("final")?.bool(weight.flag("final"))?;
        ctx.render_link("vtable index", decl, roles::VTABLE_INDEX)?;
    }

    if graph.has_link(decl, roles::CONVERSION_TYPE) {
        ctx.render_link("conversion target type", decl, roles::CONVERSION_TYPE)?;
    }

    let role = match weight.attr_str("construction role") {
        Some(
            role @ ("static constructor" | "static destructor" | "constructor" | "destructor"),
        ) => Some(role),
        _ => None,
    };
    ctx.stream().field("construction role")?.opt_string(role)?;

    if graph.has_link(decl, roles::CLONED_FUNCTION) {
        ctx.render_link("cloned function", decl, roles::CLONED_FUNCTION)?;
    }
    ctx.stream().end_object()?;
    Ok(())
}

/// Parameters, results and variables.
pub fn render_var_decl<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(decl)?;
    begin_declaration(ctx, decl)?;

    match weight.kind {
        NodeKind::ParmDecl => {
            ctx.render_link("type", decl, roles::TYPE)?;
            ctx.render_link("passing type", decl, roles::PASSING_TYPE)?;
        }
        NodeKind::ResultDecl => {
            ctx.render_link("return type", decl, roles::TYPE)?;
        }
        _ => {
            ctx.render_link("type", decl, roles::TYPE)?;
            let stream = ctx.stream();
            stream.field("thread local")?.bool(weight.flag("thread local"))?;
            stream.field("vtable")?.bool(weight.flag("virtual"))?;
        }
    }

    if matches!(weight.kind, NodeKind::ParmDecl | NodeKind::ResultDecl) {
        let style = if weight.flag("by reference") {
            "reference"
        } else {
            "copy"
        };
        ctx.stream().field("passing style")?.string(style)?;
    }
    ctx.stream().end_object()?;
    Ok(())
}

/// A type declaration must name its type.
pub fn render_type_decl<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    let Some(ty) = graph.link(decl, roles::TYPE) else {
        return Err(SerializeError::malformed(
            graph,
            decl,
            "type declaration without a type",
        ));
    };

    begin_declaration(ctx, decl)?;
    ctx.render_field("type", Some(ty))?;
    ctx.stream().end_object()?;
    Ok(())
}

/// Template parameters are grouped by nesting level; each level lists its
/// parameters with their default arguments.
pub fn render_template_decl<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    begin_declaration(ctx, decl)?;

    ctx.stream().field("parameters")?.begin_array(false)?;
    for level in graph.links(decl, roles::TEMPLATE_PARAMETERS) {
        let level_weight = graph.node(level)?;
        let stream = ctx.stream();
        stream.begin_object(false)?;
        stream.field("level")?;
        write_integer_attr(stream, level_weight, "level")?;
        stream.field("parameters")?.begin_array(false)?;
        for entry in graph.links(level, roles::ELEMENTS) {
            ctx.stream().begin_object(false)?;
            ctx.render_link("parameter", entry, roles::VALUE)?;
            ctx.render_link("default", entry, roles::PURPOSE)?;
            ctx.stream().end_object()?;
        }
        ctx.stream().end_array()?.end_object()?;
    }
    ctx.stream().end_array()?;

    ctx.render_link("result", decl, roles::TEMPLATE_RESULT)?;
    ctx.stream().end_object()?;
    Ok(())
}

pub fn render_translation_unit_decl<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    decl: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(decl)?;
    begin_declaration(ctx, decl)?;

    ctx.stream()
        .field("language standard")?
        .opt_string(weight.attr_str("language standard"))?;
    ctx.render_links("blocks", decl, roles::BLOCKS, false)?;
    ctx.stream().end_object()?;
    Ok(())
}
