//! Renderers for literal constants.

use std::io::Write;

use treecreeper_graph::{AttributeValue, NodeRef, roles};

use super::common::{begin_node, write_integer_attr};
use crate::serializers::{RenderContext, SerializeError};

fn begin_constant<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    cst: NodeRef,
) -> Result<(), SerializeError> {
    begin_node(ctx, cst)?;
    ctx.render_link("type", cst, roles::TYPE)
}

pub fn render_integer_constant<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    cst: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(cst)?;
    begin_constant(ctx, cst)?;

    let stream = ctx.stream();
    stream.field("value")?;
    write_integer_attr(stream, weight, "value")?;
    stream.field("overflow")?.bool(weight.flag("overflow"))?;
    stream.end_object()?;
    Ok(())
}

/// Real constants carry their decimal spelling; infinities and NaN use the
/// spellings `Inf`, `-Inf` and `Nan`.
pub fn render_real_constant<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    cst: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(cst)?;
    begin_constant(ctx, cst)?;

    let spelled = match weight.attr("value") {
        Some(AttributeValue::Float(value)) => Some(spell_real(*value)),
        Some(AttributeValue::Integer(value)) => Some(value.to_string()),
        Some(AttributeValue::String(value)) => Some(value.clone()),
        _ => None,
    };
    let stream = ctx.stream();
    stream.field("value")?.opt_string(spelled.as_deref())?;
    stream.field("overflow")?.bool(weight.flag("overflow"))?;
    stream.end_object()?;
    Ok(())
}

fn spell_real(value: f64) -> String {
    if value.is_nan() {
        "Nan".to_string()
    } else if value.is_infinite() {
        let spelled = if value < 0.0 { "-Inf" } else { "Inf" };
        spelled.to_string()
    } else {
        format!("{value:e}")
    }
}

/// Fixed-point constants carry their decimal spelling.
pub fn render_fixed_point_constant<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    cst: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(cst)?;
    begin_constant(ctx, cst)?;
    ctx.stream()
        .field("value")?
        .opt_string(weight.attr_str("value"))?
        .end_object()?;
    Ok(())
}

pub fn render_string_constant<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    cst: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(cst)?;
    begin_constant(ctx, cst)?;
    ctx.stream()
        .field("value")?
        .opt_string(weight.attr_str("value"))?
        .end_object()?;
    Ok(())
}

pub fn render_complex_constant<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    cst: NodeRef,
) -> Result<(), SerializeError> {
    begin_constant(ctx, cst)?;
    ctx.render_link("real part", cst, roles::REAL_PART)?;
    ctx.render_link("imaginary part", cst, roles::IMAGINARY_PART)?;
    ctx.stream().end_object()?;
    Ok(())
}

pub fn render_vector_constant<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    cst: NodeRef,
) -> Result<(), SerializeError> {
    begin_constant(ctx, cst)?;
    ctx.render_links("values", cst, roles::ELEMENTS, false)?;
    ctx.stream().end_object()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::{Registry, RenderOptions};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use treecreeper_graph::{HostGraph, NodeBuilder, NodeKind};

    fn render_one(graph: &HostGraph, node: NodeRef) -> Value {
        let registry = Registry::standard();
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(graph, &registry, &options, Vec::new());
        ctx.render(Some(node)).unwrap();
        let (bytes, _) = ctx.finish().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_wide_integer_constant() {
        let mut graph = HostGraph::new();
        let cst = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::IntegerCst)
                .attribute("value", "18446744073709551615")
                .build()
                .unwrap(),
        );

        let value = render_one(&graph, cst);
        assert_eq!(value["type"], Value::Null);
        assert_eq!(value["value"], json!(18446744073709551615u64));
        assert_eq!(value["overflow"], false);
    }

    #[test]
    fn test_integer_constant_with_leading_zeros() {
        let mut graph = HostGraph::new();
        let cst = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::IntegerCst)
                .attribute("value", "007")
                .build()
                .unwrap(),
        );

        let value = render_one(&graph, cst);
        assert_eq!(value["value"], Value::Null);
    }

    #[test]
    fn test_real_constant_spellings() {
        assert_eq!(spell_real(f64::NAN), "Nan");
        assert_eq!(spell_real(f64::NEG_INFINITY), "-Inf");
        assert_eq!(spell_real(f64::INFINITY), "Inf");
        assert_eq!(spell_real(1.5), "1.5e0");

        let mut graph = HostGraph::new();
        let cst = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::RealCst)
                .attribute("value", "2.5e+0")
                .build()
                .unwrap(),
        );
        assert_eq!(render_one(&graph, cst)["value"], "2.5e+0");
    }

    #[test]
    fn test_vector_constant_shares_elements() {
        let mut graph = HostGraph::new();
        let one = graph.add_node(
            NodeBuilder::new()
                .kind(NodeKind::IntegerCst)
                .attribute("value", 1)
                .build()
                .unwrap(),
        );
        let vector = graph.add_node(NodeBuilder::new().kind(NodeKind::VectorCst).build().unwrap());
        graph.add_link(vector, one, roles::ELEMENTS).unwrap();
        graph.add_link(vector, one, roles::ELEMENTS).unwrap();

        let value = render_one(&graph, vector);
        assert_eq!(value["values"][0]["value"], 1);
        assert_eq!(value["values"][1], json!({"kind": "reference", "referred id": 2}));
    }
}
