//! Treecreeper CLI library - streaming JSON serialization of host graphs.
//!
//! This library holds everything the `treecreeper` binary does, exposed as a
//! library to enable integration testing and embedding in other tools.
//!
//! # Modules
//!
//! - [`serializers`]: the streaming writer, reference tracking and the
//!   document orchestrator
//! - [`renderers`]: per-kind renderers for declarations, types, constants
//!   and scopes
//! - [`config`]: configuration loading and management
//! - [`commands`]: the dump command driven by the binary

pub mod commands;
pub mod config;
pub mod errors;
pub mod renderers;
pub mod serializers;

// Re-export commonly used types for convenience
pub use config::{ConfigError, TreecreeperConfig};
pub use errors::TreecreeperError;
pub use serializers::{
    DocumentSummary, Registry, RenderContext, RenderOptions, SerializeError, serialize_to_file,
    write_document,
};
