//! Renderers for type nodes.

use std::io::Write;

use treecreeper_graph::{NodeKind, NodeRef, roles};

use super::common::{begin_node, sign, write_count_attr, write_flag_list, write_integer_attr};
use crate::serializers::{RenderContext, SerializeError};

const TYPE_QUALIFIERS: &[(&str, &str)] = &[
    ("atomic", "atomic"),
    ("const", "const"),
    ("restrict", "restrict"),
    ("volatile", "volatile"),
];

/// Header shared by all types.
///
/// The next variant link is remembered rather than written inline; the
/// sweep writes it at the end of the document.
pub fn begin_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    let weight = graph.node(ty)?;

    begin_node(ctx, ty)?;
    ctx.stream().field("name")?.opt_string(graph.display_name(ty))?;
    ctx.render_link("context", ty, roles::CONTEXT)?;
    ctx.render_link("declaration", ty, roles::DECLARATION)?;

    let stream = ctx.stream();
    stream.field("complete")?.bool(weight.flag("complete"))?;
    stream.field("size")?;
    write_integer_attr(stream, weight, "size")?;
    stream.field("alignment")?;
    write_count_attr(stream, weight, "alignment")?;
    stream.field("user alignment")?.bool(weight.flag("user alignment"))?;
    stream.field("qualifiers")?;
    write_flag_list(stream, weight, TYPE_QUALIFIERS)?;
    stream
        .field("needs constructing")?
        .bool(weight.flag("needs constructing"))?;
    ctx.render_link("main variant", ty, roles::MAIN_VARIANT)?;

    if let Some(next) = graph.link(ty, roles::NEXT_VARIANT) {
        ctx.remember(next)?;
    }
    Ok(())
}

/// Type header plus bit precision.
fn begin_precisioned<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(ty)?;
    begin_type(ctx, ty)?;
    let stream = ctx.stream();
    stream.field("precision")?;
    write_count_attr(stream, weight, "precision")?;
    Ok(())
}

/// Boolean, void and language-specific types: the header alone.
pub fn render_simple_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    begin_type(ctx, ty)?;
    ctx.stream().end_object()?;
    Ok(())
}

/// Real types: header and precision.
pub fn render_precisioned_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    begin_precisioned(ctx, ty)?;
    ctx.stream().end_object()?;
    Ok(())
}

pub fn render_array_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(ty)?;
    begin_type(ctx, ty)?;
    ctx.render_link("element type", ty, roles::TYPE)?;
    ctx.render_link("index type", ty, roles::DOMAIN)?;

    let stream = ctx.stream();
    stream.field("is string")?.bool(weight.flag("string"))?;
    stream
        .field("aliased components")?
        .bool(!weight.flag("nonaliased components"))?;
    stream.end_object()?;
    Ok(())
}

pub fn render_complex_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    begin_type(ctx, ty)?;
    ctx.render_link("component type", ty, roles::TYPE)?;
    ctx.stream().end_object()?;
    Ok(())
}

/// Enumeration types list their constants as declarations.
///
/// Depending on the front end, a value-list entry holds either the constant
/// declaration itself or a bare integer constant. The latter is resolved to
/// its declaration through the tracker's constant index.
pub fn render_enumeral_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    let weight = graph.node(ty)?;
    begin_precisioned(ctx, ty)?;

    let stream = ctx.stream();
    stream.field("scoped")?.bool(weight.flag("scoped"))?;
    stream.field("sign")?.string(sign(weight))?;
    ctx.render_link("minimum value", ty, roles::MIN_VALUE)?;
    ctx.render_link("maximum value", ty, roles::MAX_VALUE)?;

    ctx.stream().field("values")?.begin_array(false)?;
    for entry in graph.links(ty, roles::VALUES) {
        let value = graph.link(entry, roles::VALUE);
        let decl = match value {
            Some(value) if graph.kind(value)? == NodeKind::ConstDecl => value,
            _ => ctx
                .tracker()
                .find_related_constant(graph, ty, entry)
                .map_err(|failure| SerializeError::constant_not_found(graph, failure))?,
        };
        ctx.render(Some(decl))?;
    }
    ctx.stream().end_array()?.end_object()?;
    Ok(())
}

pub fn render_fixed_point_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(ty)?;
    begin_precisioned(ctx, ty)?;

    let stream = ctx.stream();
    stream.field("sign")?.string(sign(weight))?;
    stream.field("fractional bits")?;
    write_count_attr(stream, weight, "fractional bits")?;
    stream.field("integral bits")?;
    write_count_attr(stream, weight, "integral bits")?;
    stream.field("saturating")?.bool(weight.flag("saturating"))?;
    stream.end_object()?;
    Ok(())
}

/// Function and method types.
///
/// Argument types exclude the terminating `void` of a prototype; the host
/// reports a prototype without it as variadic.
pub fn render_function_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(ty)?;
    begin_type(ctx, ty)?;

    ctx.render_link("result type", ty, roles::TYPE)?;
    if weight.kind == NodeKind::MethodType {
        ctx.render_link("class type", ty, roles::CLASS_TYPE)?;
    }
    ctx.render_links("argument types", ty, roles::ARGUMENT_TYPES, true)?;
    ctx.stream().field("variadic")?.bool(weight.flag("variadic"))?;
    ctx.stream().end_object()?;
    Ok(())
}

pub fn render_integer_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(ty)?;
    begin_precisioned(ctx, ty)?;

    ctx.stream().field("sign")?.string(sign(weight))?;
    ctx.render_link("minimum value", ty, roles::MIN_VALUE)?;
    ctx.render_link("maximum value", ty, roles::MAX_VALUE)?;
    ctx.stream()
        .field("is character")?
        .bool(weight.flag("string"))?;
    ctx.stream().end_object()?;
    Ok(())
}

/// Pointer, reference and null-pointer types.
pub fn render_pointer_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(ty)?;
    begin_type(ctx, ty)?;

    ctx.render_link("referred type", ty, roles::TYPE)?;
    if weight.kind == NodeKind::ReferenceType {
        ctx.stream()
            .field("rvalue reference")?
            .bool(weight.flag("rvalue"))?;
    }

    let member_pointer = weight.flag("member pointer");
    ctx.stream().field("member pointer")?.bool(member_pointer)?;
    if member_pointer {
        ctx.render_link("class type", ty, roles::CLASS_TYPE)?;
        ctx.render_link("member type", ty, roles::MEMBER_TYPE)?;
    }
    ctx.stream().end_object()?;
    Ok(())
}

/// Structures, unions and qualified unions.
///
/// A record that only holds a pointer-to-member-function is written as that
/// function type instead.
pub fn render_record_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let graph = ctx.graph();
    let weight = graph.node(ty)?;

    if weight.flag("pointer to member function") {
        let Some(function_type) = graph.link(ty, roles::MEMBER_FUNCTION_TYPE) else {
            return Err(SerializeError::malformed(
                graph,
                ty,
                "pointer-to-member-function record without a function type",
            ));
        };
        return ctx.render(Some(function_type));
    }

    begin_type(ctx, ty)?;

    let bases = graph.links(ty, roles::BASES);
    if !bases.is_empty() || weight.flag("has base info") {
        ctx.stream().field("base types")?.begin_array(false)?;
        for base in bases {
            let base_weight = graph.node(base)?;
            let access = match base_weight.attr_str("access") {
                Some(access @ ("private" | "protected")) => access,
                _ => "public",
            };
            ctx.stream().begin_object(false)?;
            ctx.render_link("type", base, roles::TYPE)?;
            let stream = ctx.stream();
            stream.field("access")?.string(access)?;
            stream.field("virtual")?.bool(base_weight.flag("virtual"))?;
            stream.end_object()?;
        }
        ctx.stream().end_array()?;
    }

    ctx.render_links("fields", ty, roles::FIELDS, false)?;
    ctx.render_links("methods", ty, roles::METHODS, false)?;
    ctx.stream().end_object()?;
    Ok(())
}

pub fn render_vector_type<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    ty: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(ty)?;
    begin_type(ctx, ty)?;

    ctx.render_link("element type", ty, roles::TYPE)?;
    let stream = ctx.stream();
    stream.field("element count")?;
    write_count_attr(stream, weight, "element count")?;
    stream.end_object()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::{RenderOptions, Registry};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use treecreeper_graph::{HostGraph, Location, NodeBuilder};

    fn render_one(graph: &HostGraph, node: NodeRef) -> Result<Value, SerializeError> {
        let registry = Registry::standard();
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(graph, &registry, &options, Vec::new());
        ctx.render(Some(node))?;
        let (bytes, _) = ctx.finish()?;
        Ok(serde_json::from_slice(&bytes).unwrap())
    }

    fn add(graph: &mut HostGraph, kind: NodeKind) -> NodeRef {
        graph.add_node(NodeBuilder::new().kind(kind).build().unwrap())
    }

    fn ident(graph: &mut HostGraph, name: &str) -> NodeRef {
        graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::IdentifierNode)
                .name(name)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_integer_type_self_main_variant() {
        let mut graph = HostGraph::new();
        let int_type = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::IntegerType)
                .name("unsigned int")
                .attribute("precision", 32)
                .attribute("size", 32)
                .attribute("unsigned", true)
                .attribute("complete", true)
                .attribute("const", true)
                .build()
                .unwrap(),
        );
        graph.add_link(int_type, int_type, roles::MAIN_VARIANT).unwrap();

        let value = render_one(&graph, int_type).unwrap();
        assert_eq!(value["name"], "unsigned int");
        assert_eq!(value["complete"], true);
        assert_eq!(value["precision"], 32);
        assert_eq!(value["sign"], "unsigned");
        assert_eq!(value["qualifiers"], json!(["const"]));
        assert_eq!(value["main variant"], json!({"kind": "reference", "referred id": 1}));
        assert_eq!(value["minimum value"], Value::Null);
        assert_eq!(value["is character"], false);
    }

    #[test]
    fn test_next_variant_is_not_inlined() {
        let mut graph = HostGraph::new();
        let main = add(&mut graph, NodeKind::BooleanType);
        let variant = add(&mut graph, NodeKind::BooleanType);
        graph.add_link(main, variant, roles::NEXT_VARIANT).unwrap();
        graph.add_link(variant, main, roles::MAIN_VARIANT).unwrap();

        let registry = Registry::standard();
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&graph, &registry, &options, Vec::new());
        ctx.render(Some(main)).unwrap();
        assert!(ctx.tracker().is_remembered(variant));
        assert!(!ctx.tracker().is_visited(variant));
        assert_eq!(ctx.tracker().pending(), vec![variant]);
    }

    #[test]
    fn test_function_type_arguments() {
        let mut graph = HostGraph::new();
        let int_type = add(&mut graph, NodeKind::IntegerType);
        let func = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::MethodType)
                .attribute("variadic", true)
                .build()
                .unwrap(),
        );
        graph.add_link(func, int_type, roles::TYPE).unwrap();
        graph.add_link(func, int_type, roles::ARGUMENT_TYPES).unwrap();
        graph.add_link(func, int_type, roles::ARGUMENT_TYPES).unwrap();

        let value = render_one(&graph, func).unwrap();
        assert_eq!(value["result type"]["node type"], "integer_type");
        assert_eq!(value["class type"], Value::Null);
        assert_eq!(
            value["argument types"],
            json!([
                {"kind": "reference", "referred id": 2},
                {"kind": "reference", "referred id": 2}
            ])
        );
        assert_eq!(value["variadic"], true);
    }

    #[test]
    fn test_record_members_and_bases() {
        let mut graph = HostGraph::new();
        let base_type = add(&mut graph, NodeKind::RecordType);
        let record = add(&mut graph, NodeKind::RecordType);
        let base = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::TreeList)
                .attribute("access", "protected")
                .attribute("virtual", true)
                .build()
                .unwrap(),
        );
        graph.add_link(base, base_type, roles::TYPE).unwrap();
        graph.add_link(record, base, roles::BASES).unwrap();

        let field = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::FieldDecl)
                .location(Location::new("a.cc", 2, 9))
                .build()
                .unwrap(),
        );
        graph.add_link(record, field, roles::FIELDS).unwrap();
        graph.add_link(field, record, roles::FIELD_CONTEXT).unwrap();

        let value = render_one(&graph, record).unwrap();
        let bases = value["base types"].as_array().unwrap();
        assert_eq!(bases.len(), 1);
        assert_eq!(bases[0]["type"]["node type"], "record_type");
        assert_eq!(bases[0]["access"], "protected");
        assert_eq!(bases[0]["virtual"], true);
        assert_eq!(value["fields"][0]["node type"], "field_decl");
        assert_eq!(
            value["fields"][0]["declaring class"],
            json!({"kind": "reference", "referred id": 1})
        );
        assert_eq!(value["methods"], json!([]));
    }

    #[test]
    fn test_record_without_bases_omits_field() {
        let mut graph = HostGraph::new();
        let record = add(&mut graph, NodeKind::UnionType);
        let value = render_one(&graph, record).unwrap();
        assert!(value.get("base types").is_none());
    }

    #[test]
    fn test_pointer_to_member_function_record() {
        let mut graph = HostGraph::new();
        let method = add(&mut graph, NodeKind::MethodType);
        let record = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::RecordType)
                .attribute("pointer to member function", true)
                .build()
                .unwrap(),
        );
        graph.add_link(record, method, roles::MEMBER_FUNCTION_TYPE).unwrap();

        let value = render_one(&graph, record).unwrap();
        assert_eq!(value["node type"], "method_type");
        assert_eq!(value["id"], 2);
    }

    fn enum_with_entry(entry_value: NodeKind) -> (HostGraph, NodeRef, NodeRef) {
        let mut graph = HostGraph::new();
        let enum_type = add(&mut graph, NodeKind::EnumeralType);
        graph.add_link(enum_type, enum_type, roles::MAIN_VARIANT).unwrap();
        let red = ident(&mut graph, "RED");
        let zero = add(&mut graph, NodeKind::IntegerCst);

        let decl = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::ConstDecl)
                .location(Location::new("color.c", 1, 14))
                .build()
                .unwrap(),
        );
        graph.add_link(decl, red, roles::NAME).unwrap();
        graph.add_link(decl, zero, roles::INITIAL).unwrap();
        graph.add_link(decl, enum_type, roles::TYPE).unwrap();

        let entry = add(&mut graph, NodeKind::TreeList);
        graph.add_link(entry, red, roles::PURPOSE).unwrap();
        let target = if entry_value == NodeKind::ConstDecl { decl } else { zero };
        graph.add_link(entry, target, roles::VALUE).unwrap();
        graph.add_link(enum_type, entry, roles::VALUES).unwrap();

        (graph, enum_type, decl)
    }

    #[test]
    fn test_enum_values_hold_declarations() {
        let (graph, enum_type, _) = enum_with_entry(NodeKind::ConstDecl);
        let value = render_one(&graph, enum_type).unwrap();
        let constant = &value["values"][0];
        assert_eq!(constant["node type"], "const_decl");
        assert_eq!(constant["name"], "RED");
        assert_eq!(constant["type"], json!({"kind": "reference", "referred id": 1}));
    }

    #[test]
    fn test_enum_values_resolved_through_index() {
        let (graph, enum_type, decl) = enum_with_entry(NodeKind::IntegerCst);

        let registry = Registry::standard();
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&graph, &registry, &options, Vec::new());
        ctx.remember(decl).unwrap();
        ctx.render(Some(enum_type)).unwrap();
        let (bytes, _) = ctx.finish().unwrap();

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["values"][0]["node type"], "const_decl");
        assert_eq!(value["values"][0]["value"]["node type"], "integer_cst");
    }

    #[test]
    fn test_enum_value_without_declaration_fails() {
        let (graph, enum_type, _) = enum_with_entry(NodeKind::IntegerCst);
        let result = render_one(&graph, enum_type);
        assert!(matches!(result, Err(SerializeError::ConstantNotFound { .. })));
    }
}
