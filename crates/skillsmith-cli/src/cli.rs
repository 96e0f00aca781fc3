//! CLI argument definitions for skillsmith.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use skillsmith_core::EntryKind;

/// skillsmith -- index generated skills and agents for keyword search.
#[derive(Parser)]
#[command(
    name = "skillsmith",
    version,
    about = "skillsmith -- registry of generated repository skills and agents",
    long_about = "Normalizes a saved repository analysis response into skill and agent \
                  records, rebuilds the registry, and searches it."
)]
pub struct Cli {
    /// Repository root the registry lives under (overrides config).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Explicit registry file path (overrides --root and config).
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize an analysis response and rebuild the registry from it.
    Index {
        /// File holding the raw analysis response (text or JSON).
        #[arg(long, short)]
        response: PathBuf,

        /// Compute entries without writing the registry.
        #[arg(long)]
        dry_run: bool,
    },

    /// Search the registry.
    Search {
        /// Search query.
        query: String,

        /// Restrict results to `skill` or `agent` entries.
        #[arg(long = "type", short = 't')]
        kind: Option<EntryKind>,

        /// Maximum number of results (defaults to the configured limit).
        #[arg(long, short)]
        limit: Option<usize>,

        /// Print the relevance score next to each result.
        #[arg(long)]
        scores: bool,
    },

    /// List every registry entry in file order.
    List {
        /// Restrict output to `skill` or `agent` entries.
        #[arg(long = "type", short = 't')]
        kind: Option<EntryKind>,
    },

    /// Show one registry entry by exact name.
    Get {
        /// Entry name.
        name: String,
    },

    /// Print the agent hierarchy described by an analysis response.
    Tree {
        /// File holding the raw analysis response.
        #[arg(long, short)]
        response: PathBuf,
    },

    /// Check skill and agent references in an analysis response.
    Validate {
        /// File holding the raw analysis response.
        #[arg(long, short)]
        response: PathBuf,
    },
}
