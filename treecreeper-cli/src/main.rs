//! Treecreeper - Dump a compiler's program graph as JSON.
//!
//! Reads a host graph snapshot captured from the compiler and streams it
//! out as a single JSON document: declarations, types and constants with
//! shared nodes written once and referenced by id afterwards, followed by
//! the preprocessor's macros and include tree.
//!
//! # Usage
//!
//! ```bash
//! treecreeper --input unit.graph.json --output unit.json
//!
//! # Include compiler built-ins, with debug logging
//! treecreeper -i unit.graph.json -o unit.json --builtins --verbose
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use treecreeper_cli::commands::{self, DumpOptions};

/// Treecreeper - Dump a compiler's program graph as JSON
#[derive(Parser)]
#[command(name = "treecreeper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Graph snapshot to serialize
    #[arg(long, short)]
    input: PathBuf,

    /// Output file (overrides config and TREECREEPER_OUTPUT)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Include compiler built-in declarations
    #[arg(long, short)]
    builtins: bool,

    /// Show debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "treecreeper=debug"
    } else {
        "treecreeper=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = DumpOptions {
        input: cli.input,
        output: cli.output,
        config: cli.config,
        builtins: cli.builtins,
    };

    if let Err(e) = commands::run_dump(options) {
        eprintln!("{}", e.format_for_cli());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
