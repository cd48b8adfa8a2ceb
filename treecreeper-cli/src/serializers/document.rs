//! Top-level document assembly.
//!
//! A document is one root object:
//!
//! ```text
//! {
//!     "kind": "root",
//!     "metadata": { ... },
//!     "declarations": [ <roots>, <swept nodes> ],
//!     "macros": [ ... ],
//!     "includes": [ ... ]
//! }
//! ```
//!
//! Roots are written first. Nodes that were discovered but never written in
//! full (forward links such as type variants, constants reached only through
//! host callbacks) are appended to `declarations` by the sweep, so every
//! discovered node is written in full exactly once.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use treecreeper_graph::{CompilerInfo, Host, IncludeEvent, MacroDefinition};

use super::RenderOptions;
use super::context::RenderContext;
use super::error::SerializeError;
use super::json_stream::JsonStream;
use super::registry::Registry;
use crate::renderers::common::write_location;

/// Counts reported after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSummary {
    /// Node ids handed out
    pub ids_allocated: u64,

    /// Nodes written in full
    pub nodes_written: usize,

    /// Nodes written by the sweep rather than reached from a root
    pub nodes_swept: usize,

    /// Nodes written with the unsupported fallback
    pub unsupported: usize,

    pub macros: usize,

    pub include_events: usize,
}

/// Write the whole document for `host` to `sink`.
///
/// Refuses to write anything when the host already reported errors.
pub fn write_document<H: Host, W: Write>(
    host: &H,
    registry: &Registry<W>,
    options: &RenderOptions,
    sink: W,
) -> Result<(W, DocumentSummary), SerializeError> {
    if host.had_upstream_errors() {
        return Err(SerializeError::UpstreamErrors(
            host.graph().metadata.error_count,
        ));
    }

    let mut ctx = RenderContext::new(host.graph(), registry, options, sink);
    for node in host.discovered_nodes() {
        ctx.remember(node)?;
    }

    ctx.stream().begin_object(false)?;
    ctx.stream().field("kind")?.string("root")?;
    write_metadata(ctx.stream(), options, host.compiler_info())?;

    ctx.stream().field("declarations")?.begin_array(false)?;
    for root in host.root_nodes() {
        ctx.render(Some(root))?;
    }
    let nodes_swept = sweep(&mut ctx)?;
    ctx.stream().end_array()?;

    ctx.stream().field("macros")?.begin_array(false)?;
    let mut macros = 0;
    host.for_each_macro_definition(|definition| {
        if definition.builtin {
            return Ok(());
        }
        macros += 1;
        write_macro(ctx.stream(), definition)
    })?;
    ctx.stream().end_array()?;

    ctx.stream().field("includes")?.begin_array(false)?;
    let mut includes = IncludeWriter::default();
    host.for_each_include_event(|event| includes.write(ctx.stream(), event))?;
    includes.finish(ctx.stream())?;
    ctx.stream().end_array()?;

    ctx.stream().end_object()?;

    let unsupported = ctx.unsupported_count();
    let (sink, tracker) = ctx.finish()?;
    let summary = DocumentSummary {
        ids_allocated: tracker.ids_allocated(),
        nodes_written: tracker.visited_count(),
        nodes_swept,
        unsupported,
        macros,
        include_events: includes.events,
    };
    Ok((sink, summary))
}

/// Write the document for `host` to the file at `path`.
///
/// The file is only created once the host is known to be error-free, and is
/// removed again if the run fails part-way.
pub fn serialize_to_file<H: Host>(
    host: &H,
    options: &RenderOptions,
    path: &Path,
) -> Result<DocumentSummary, SerializeError> {
    if host.had_upstream_errors() {
        return Err(SerializeError::UpstreamErrors(
            host.graph().metadata.error_count,
        ));
    }

    let file = File::create(path)?;
    let registry = Registry::standard();
    let result = write_document(host, &registry, options, BufWriter::new(file)).and_then(
        |(writer, summary)| {
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            Ok(summary)
        },
    );

    if result.is_err() {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to remove incomplete output {}: {}", path.display(), e);
        }
    }
    result
}

/// Write every remembered node that was never written in full.
///
/// Writing a node can remember further nodes, so the sweep repeats until
/// nothing is pending.
fn sweep<W: Write>(ctx: &mut RenderContext<'_, W>) -> Result<usize, SerializeError> {
    let mut swept = 0;
    loop {
        let pending = ctx.tracker().pending();
        if pending.is_empty() {
            break;
        }
        tracing::debug!("Sweeping {} unwritten node(s)", pending.len());
        for node in pending {
            if !ctx.tracker().is_visited(node) {
                ctx.render(Some(node))?;
                swept += 1;
            }
        }
    }
    Ok(swept)
}

fn write_metadata<W: Write>(
    stream: &mut JsonStream<W>,
    options: &RenderOptions,
    compiler: &CompilerInfo,
) -> Result<(), SerializeError> {
    stream.field("metadata")?.begin_object(false)?;
    stream.field("kind")?.string("metadata_root")?;

    stream.field("format")?.begin_object(false)?;
    stream.field("kind")?.string("format_info")?;
    stream.field("creator")?.string(&options.creator)?;
    stream.field("version")?.string(&options.format_version)?;
    stream.end_object()?;

    stream.field("compiler")?.begin_object(false)?;
    stream.field("kind")?.string("compiler_info")?;
    stream.field("name")?.string(&compiler.name)?;
    stream.field("version")?.string(&compiler.version)?;
    stream.field("revision")?.string(&compiler.revision)?;
    stream.field("build date")?.string(&compiler.build_date)?;
    stream.end_object()?;

    stream.end_object()?;
    Ok(())
}

fn write_macro<W: Write>(
    stream: &mut JsonStream<W>,
    definition: &MacroDefinition,
) -> Result<(), SerializeError> {
    stream.begin_object(false)?;
    stream.field("kind")?.string("macro")?;
    stream.field("name")?.string(&definition.name)?;
    stream.field("location")?;
    write_location(stream, definition.location.as_ref(), false)?;

    stream.field("arguments")?;
    match &definition.parameters {
        None => {
            stream.null()?;
        }
        Some(parameters) => {
            stream.begin_array(true)?;
            for parameter in parameters {
                stream.string(parameter)?;
            }
            stream.end_array()?;
            stream.field("variadic")?.bool(definition.variadic)?;
        }
    }

    stream.field("tokens")?.begin_array(false)?;
    for token in &definition.tokens {
        stream.begin_object(true)?;
        stream.field("kind")?.string("macro_token")?;
        stream.field("type")?.string(&token.token_type)?;
        stream.field("flags")?.begin_array(true)?;
        for flag in &token.flags {
            stream.string(flag.as_str())?;
        }
        stream.end_array()?;
        stream.field("text")?.string(&token.text)?;
        stream.end_object()?;
    }
    stream.end_array()?;
    stream.end_object()?;
    Ok(())
}

/// Turns the flat include event stream into nested include objects.
///
/// Entering a file opens an object whose `includes` array collects what the
/// file itself includes; leaving closes it. The main file is never left, so
/// whatever is still open at the end gets closed by [`IncludeWriter::finish`].
#[derive(Debug, Default)]
struct IncludeWriter {
    open: usize,
    events: usize,
}

impl IncludeWriter {
    fn write<W: Write>(
        &mut self,
        stream: &mut JsonStream<W>,
        event: &IncludeEvent,
    ) -> Result<(), SerializeError> {
        self.events += 1;
        match event {
            IncludeEvent::Enter { file, from } => {
                stream.begin_object(false)?;
                stream.field("kind")?.string("include")?;
                stream.field("include file")?.string(file)?;
                stream.field("location")?;
                write_location(stream, from.as_ref(), false)?;
                stream.field("includes")?.begin_array(false)?;
                self.open += 1;
            }
            IncludeEvent::Rename { file, line, from } => {
                stream.begin_object(false)?;
                stream.field("kind")?.string("include")?;
                stream.field("rename")?.begin_object(true)?;
                stream.field("file")?.string(file)?;
                stream.field("line")?.unsigned(u64::from(*line))?;
                stream.end_object()?;
                stream.field("location")?;
                write_location(stream, from.as_ref(), false)?;
                stream.end_object()?;
            }
            IncludeEvent::Leave => {
                if self.open == 0 {
                    tracing::warn!("Ignoring include leave event with no file open");
                } else {
                    stream.end_array()?.end_object()?;
                    self.open -= 1;
                }
            }
        }
        Ok(())
    }

    fn finish<W: Write>(&mut self, stream: &mut JsonStream<W>) -> Result<(), SerializeError> {
        while self.open > 0 {
            stream.end_array()?.end_object()?;
            self.open -= 1;
        }
        Ok(())
    }
}
