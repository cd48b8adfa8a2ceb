use std::path::PathBuf;

use thiserror::Error;
use treecreeper_graph::GraphError;

use crate::config::ConfigError;
use crate::serializers::SerializeError;

#[derive(Debug, Error)]
pub enum TreecreeperError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Graph snapshot not found: {path}")]
    SnapshotNotFound { path: PathBuf },

    #[error("Failed to load graph snapshot {path}: {source}")]
    SnapshotLoad {
        path: PathBuf,
        #[source]
        source: GraphError,
    },

    #[error("Failed to write {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: SerializeError,
    },
}

impl TreecreeperError {
    /// Get a suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            TreecreeperError::Config(ConfigError::MissingOutput) => Some(
                "Pass --output <file>, set TREECREEPER_OUTPUT, or add 'output:' to treecreeper.yaml",
            ),
            TreecreeperError::Config(ConfigError::NotFound(_)) => {
                Some("Check the path given to --config, or drop the flag to use treecreeper.yaml")
            }
            TreecreeperError::Config(ConfigError::ParseError(_)) => {
                Some("Fix the YAML syntax in the configuration file.")
            }
            TreecreeperError::Config(_) => None,
            TreecreeperError::SnapshotNotFound { .. } => {
                Some("Check the path given to --input.")
            }
            TreecreeperError::SnapshotLoad { .. } => {
                Some("The snapshot may be truncated or written by an incompatible version.")
            }
            TreecreeperError::Serialize { source, .. } => match source {
                SerializeError::UpstreamErrors(_) => {
                    Some("Fix the compilation errors first; no output is written for failed units.")
                }
                SerializeError::ConstantNotFound { .. } | SerializeError::MalformedNode { .. } => {
                    Some("The graph snapshot is inconsistent. Re-capture it from the compiler.")
                }
                SerializeError::Io(_) => {
                    Some("Check that the output directory exists and is writable.")
                }
                SerializeError::Graph(_) => None,
            },
        }
    }

    /// Format error with suggestion for CLI output
    pub fn format_for_cli(&self) -> String {
        let mut output = format!("Error: {}", self);

        if let Some(suggestion) = self.suggestion() {
            output.push_str(&format!("\n\nSuggestion: {}", suggestion));
        }

        output
    }
}
