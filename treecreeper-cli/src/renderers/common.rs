//! Field groups shared by several renderers.

use std::io::{self, Write};

use treecreeper_graph::{AttributeValue, Location, Node, NodeRef, roles};

use crate::serializers::json_stream::JsonStream;
use crate::serializers::{RenderContext, SerializeError};

/// Open a node's object and write the fields every node carries.
pub fn begin_node<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    node: NodeRef,
) -> Result<(), SerializeError> {
    write_node_header(ctx, node, true)
}

fn write_node_header<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    node: NodeRef,
    supported: bool,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(node)?;
    let id = ctx.id_of(node)?;
    let description = weight.description.as_deref().filter(|d| !d.is_empty());

    let stream = ctx.stream();
    stream.begin_object(false)?;
    stream
        .field("kind")?
        .string(if supported { "node" } else { "unsupported_node" })?;
    stream.field("id")?.unsigned(id.get())?;
    stream.field("node type")?.string(weight.kind_name())?;
    stream.field("description")?.opt_string(description)?;
    if !supported {
        stream.field("supported")?.bool(false)?;
    }
    Ok(())
}

/// Fallback for kinds without a renderer: identity and description only.
pub fn render_unsupported<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    node: NodeRef,
) -> Result<(), SerializeError> {
    write_node_header(ctx, node, false)?;
    ctx.stream().end_object()?;
    Ok(())
}

/// Identifiers are written inline as plain strings.
///
/// Operator names get an `operator ` prefix. Conversion operators name a
/// type rather than a spelling, so they are written as an object instead.
pub fn render_identifier<W: Write>(
    ctx: &mut RenderContext<'_, W>,
    node: NodeRef,
) -> Result<(), SerializeError> {
    let weight = ctx.graph().node(node)?;

    if weight.flag("conversion operator") {
        begin_node(ctx, node)?;
        ctx.stream().field("conversion operator")?.bool(true)?;
        ctx.render_link("target type", node, roles::TYPE)?;
        ctx.stream().end_object()?;
        return Ok(());
    }

    let name = weight.name.as_deref().unwrap_or_default();
    if weight.flag("operator") {
        let spelled = if name.is_empty() {
            "operator".to_string()
        } else {
            format!("operator {name}")
        };
        ctx.stream().string(&spelled)?;
    } else {
        ctx.stream().string(name)?;
    }
    Ok(())
}

/// Write a source location value.
///
/// Built-in entities have no real position and are written as `"built-in"`;
/// a missing or file-less location is `null`.
pub fn write_location<W: Write>(
    stream: &mut JsonStream<W>,
    location: Option<&Location>,
    builtin: bool,
) -> io::Result<()> {
    if builtin {
        stream.string("built-in")?;
        return Ok(());
    }
    match location {
        Some(location) if !location.file.is_empty() => {
            stream.begin_object(true)?;
            stream.field("kind")?.string("source_location")?;
            stream.field("file")?.string(&location.file)?;
            stream.field("line")?.unsigned(u64::from(location.line))?;
            stream.field("column")?.unsigned(u64::from(location.column))?;
            stream.field("system header")?.bool(location.system_header)?;
            stream.end_object()?;
        }
        _ => {
            stream.null()?;
        }
    }
    Ok(())
}

/// Format an integer attribute as a JSON number.
///
/// Hosts pass values wider than 64 bits as decimal strings; those are
/// written verbatim. Anything else is `None`.
pub fn integer_fragment(value: Option<&AttributeValue>) -> Option<String> {
    match value? {
        AttributeValue::Integer(n) => Some(n.to_string()),
        AttributeValue::String(text) if is_decimal(text) => Some(text.clone()),
        _ => None,
    }
}

/// A JSON integer: optional minus, then `0` or a digit string without a
/// leading zero.
fn is_decimal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// Write an integer attribute, or `null` when it is absent.
pub fn write_integer_attr<W: Write>(
    stream: &mut JsonStream<W>,
    weight: &Node,
    key: &str,
) -> io::Result<()> {
    match integer_fragment(weight.attr(key)) {
        Some(fragment) => stream.raw(&fragment)?,
        None => stream.null()?,
    };
    Ok(())
}

/// Write a count attribute that defaults to zero.
pub fn write_count_attr<W: Write>(
    stream: &mut JsonStream<W>,
    weight: &Node,
    key: &str,
) -> io::Result<()> {
    stream.integer(weight.attr_i64(key).unwrap_or(0))?;
    Ok(())
}

/// Write a compact array holding the label of every set flag.
///
/// `flags` pairs an attribute key with the label written for it.
pub fn write_flag_list<W: Write>(
    stream: &mut JsonStream<W>,
    weight: &Node,
    flags: &[(&str, &str)],
) -> io::Result<()> {
    stream.begin_array(true)?;
    for (key, label) in flags {
        if weight.flag(key) {
            stream.string(label)?;
        }
    }
    stream.end_array()?;
    Ok(())
}

pub fn sign(weight: &Node) -> &'static str {
    if weight.flag("unsigned") {
        "unsigned"
    } else {
        "signed"
    }
}
