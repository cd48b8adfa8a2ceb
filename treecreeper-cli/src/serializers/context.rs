//! Run-scoped render state shared by every renderer.

use std::io::Write;

use treecreeper_graph::{HostGraph, NodeRef};

use super::RenderOptions;
use super::error::SerializeError;
use super::json_stream::JsonStream;
use super::registry::{Registry, Renderer};
use super::tracker::{NodeId, Tracker};
use crate::renderers::common::render_unsupported;

/// Writer, tracker and lookup tables for one serialization run.
///
/// A context is created empty for each document and dropped once the
/// document is closed; nothing carries over between runs.
pub struct RenderContext<'a, W: Write> {
    graph: &'a HostGraph,
    registry: &'a Registry<W>,
    options: &'a RenderOptions,
    stream: JsonStream<W>,
    tracker: Tracker,
    unsupported: usize,
}

impl<'a, W: Write> RenderContext<'a, W> {
    pub fn new(
        graph: &'a HostGraph,
        registry: &'a Registry<W>,
        options: &'a RenderOptions,
        sink: W,
    ) -> Self {
        Self {
            graph,
            registry,
            options,
            stream: JsonStream::new(sink),
            tracker: Tracker::new(),
            unsupported: 0,
        }
    }

    pub fn graph(&self) -> &'a HostGraph {
        self.graph
    }

    pub fn options(&self) -> &'a RenderOptions {
        self.options
    }

    pub fn stream(&mut self) -> &mut JsonStream<W> {
        &mut self.stream
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Number of nodes written with the unsupported fallback.
    pub fn unsupported_count(&self) -> usize {
        self.unsupported
    }

    pub fn id_of(&mut self, node: NodeRef) -> Result<NodeId, SerializeError> {
        Ok(self.tracker.id_of(self.graph, node)?)
    }

    pub fn remember(&mut self, node: NodeRef) -> Result<(), SerializeError> {
        Ok(self.tracker.remember(self.graph, node)?)
    }

    /// Write `node` as one JSON value; `None` writes `null`.
    ///
    /// Kinds without a renderer are written with the unsupported fallback.
    pub fn render(&mut self, node: Option<NodeRef>) -> Result<(), SerializeError> {
        let Some(node) = node else {
            self.stream.null()?;
            return Ok(());
        };

        let kind = self.graph.kind(node)?;
        match self.registry.lookup(kind) {
            Some(renderer) => self.dispatch(node, renderer),
            None => {
                if !self.tracker.is_visited(node) {
                    let weight = self.graph.node(node)?;
                    tracing::warn!(
                        node = %weight.label(),
                        "Unsupported node kind {}; output will be incomplete",
                        weight.kind_name()
                    );
                    self.unsupported += 1;
                }
                self.dispatch(node, render_unsupported::<W>)
            }
        }
    }

    /// Write `node` in full with `renderer`, or as a reference stub if it
    /// was already written in full.
    pub fn dispatch(&mut self, node: NodeRef, renderer: Renderer<W>) -> Result<(), SerializeError> {
        let id = self.id_of(node)?;
        let kind = self.graph.kind(node)?;

        if self.tracker.should_reference(kind, node) {
            self.stream.begin_object(true)?;
            self.stream.field("kind")?.string("reference")?;
            self.stream.field("referred id")?.unsigned(id.get())?;
            self.stream.end_object()?;
            Ok(())
        } else {
            self.tracker.mark_visited(node);
            renderer(self, node)
        }
    }

    /// Write a field whose value is `node`.
    pub fn render_field(&mut self, name: &str, node: Option<NodeRef>) -> Result<(), SerializeError> {
        self.stream.field(name)?;
        self.render(node)
    }

    /// Write a field whose value is the first `role` link of `node`.
    pub fn render_link(
        &mut self,
        name: &str,
        node: NodeRef,
        role: &str,
    ) -> Result<(), SerializeError> {
        let target = self.graph.link(node, role);
        self.render_field(name, target)
    }

    /// Write a field holding an array of every `role` link of `node`.
    pub fn render_links(
        &mut self,
        name: &str,
        node: NodeRef,
        role: &str,
        compact: bool,
    ) -> Result<(), SerializeError> {
        self.stream.field(name)?.begin_array(compact)?;
        for target in self.graph.links(node, role) {
            self.render(Some(target))?;
        }
        self.stream.end_array()?;
        Ok(())
    }

    /// Close the document and hand back the sink and the final tracker state.
    pub fn finish(self) -> Result<(W, Tracker), SerializeError> {
        let sink = self.stream.close()?;
        Ok((sink, self.tracker))
    }
}
