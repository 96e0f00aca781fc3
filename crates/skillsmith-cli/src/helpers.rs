//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, response loading, and entry formatting.

use std::path::Path;

use anyhow::{Context, Result};
use skillsmith_core::{AnalysisResult, RegistryEntry, parse_analysis_response};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
///
/// Logs go to stderr so command output on stdout stays pipeable.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Analysis response
// ---------------------------------------------------------------------------

/// Read and normalize a saved analysis response.
pub fn load_analysis(path: &Path) -> Result<AnalysisResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read response file {}", path.display()))?;
    parse_analysis_response(&text)
        .with_context(|| format!("failed to parse response file {}", path.display()))
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// One-line summary of an entry: kind, name, parent marker, description.
pub fn format_entry(entry: &RegistryEntry) -> String {
    let mut line = format!("  [{}] {}", entry.kind, entry.name);
    if let Some(parent) = &entry.parent_agent {
        line.push_str(&format!(" (under {parent})"));
    }
    if let Some(category) = &entry.category {
        line.push_str(&format!(" <{category}>"));
    }
    if !entry.description.is_empty() {
        line.push_str(&format!(" -- {}", truncate(&entry.description, 80)));
    }
    line
}

/// Truncate to at most `max` characters, appending `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
