//! The `treecreeper` dump command.
//!
//! Loads a host graph snapshot and writes it out as a JSON document.

use std::path::PathBuf;

use treecreeper_graph::HostGraph;

use crate::config::TreecreeperConfig;
use crate::errors::TreecreeperError;
use crate::serializers::{DocumentSummary, serialize_to_file};

/// Options for the dump command.
#[derive(Debug, Default)]
pub struct DumpOptions {
    /// Graph snapshot to read
    pub input: PathBuf,
    /// Output file; overrides config and environment
    pub output: Option<PathBuf>,
    /// Configuration file; `./treecreeper.yaml` when absent
    pub config: Option<PathBuf>,
    /// Include built-in declarations
    pub builtins: bool,
}

/// Run the dump command.
pub fn run_dump(options: DumpOptions) -> Result<DocumentSummary, TreecreeperError> {
    let mut config = match &options.config {
        Some(path) => TreecreeperConfig::load_from_path(path)?,
        None => TreecreeperConfig::load_default()?,
    };
    config.apply_env_overrides()?;

    if let Some(output) = options.output {
        config.output = Some(output);
    }
    if options.builtins {
        config.builtins = true;
    }

    // Settle the destination before touching the input.
    let output = config.resolve_output()?;

    if !options.input.exists() {
        return Err(TreecreeperError::SnapshotNotFound {
            path: options.input,
        });
    }
    let graph =
        HostGraph::load_from_file(&options.input).map_err(|source| {
            TreecreeperError::SnapshotLoad {
                path: options.input.clone(),
                source,
            }
        })?;
    tracing::info!(
        "Loaded {} nodes and {} links from {}",
        graph.node_count(),
        graph.link_count(),
        options.input.display()
    );

    let summary = serialize_to_file(&graph, &config.render_options(), &output).map_err(
        |source| TreecreeperError::Serialize {
            path: output.clone(),
            source,
        },
    )?;

    tracing::info!(
        "Wrote {} ({} ids, {} swept, {} unsupported)",
        output.display(),
        summary.ids_allocated,
        summary.nodes_swept,
        summary.unsupported
    );
    Ok(summary)
}
