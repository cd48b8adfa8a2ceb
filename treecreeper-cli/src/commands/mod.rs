//! CLI commands for Treecreeper.

pub mod dump;

pub use dump::{DumpOptions, run_dump};
