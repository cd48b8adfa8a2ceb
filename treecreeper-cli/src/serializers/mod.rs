//! Streaming JSON serialization of a host graph.
//!
//! The pieces, bottom-up:
//!
//! - [`json_stream`]: an incremental JSON writer that never builds the
//!   document in memory
//! - [`tracker`]: node ids, the visited set and the remembered set
//! - [`registry`]: the per-kind renderer table
//! - [`context`]: run-scoped state handed to every renderer
//! - [`document`]: the root object, the sweep, macros and includes

pub mod context;
pub mod document;
pub mod error;
pub mod json_stream;
pub mod registry;
pub mod tracker;

pub use context::RenderContext;
pub use document::{DocumentSummary, serialize_to_file, write_document};
pub use error::SerializeError;
pub use json_stream::JsonStream;
pub use registry::{Registry, Renderer};
pub use tracker::{NodeId, Tracker};

/// Default `creator` written to the document metadata.
pub const DEFAULT_CREATOR: &str = "Treecreeper";

/// Default format version written to the document metadata.
pub const DEFAULT_FORMAT_VERSION: &str = "treecreeper-0";

/// Knobs for one serialization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Write compiler built-in declarations found in scopes
    pub include_builtins: bool,

    pub creator: String,

    pub format_version: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_builtins: false,
            creator: DEFAULT_CREATOR.to_string(),
            format_version: DEFAULT_FORMAT_VERSION.to_string(),
        }
    }
}
