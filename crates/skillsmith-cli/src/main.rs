//! CLI entry point for skillsmith.
//!
//! This binary provides the `skillsmith` command with subcommands for
//! indexing an analysis response and querying the resulting registry.

mod cli;
mod config;
mod helpers;

use anyhow::{Context, Result, bail};
use clap::Parser;
use skillsmith_core::{AgentForest, EntryKind, Registry, SearchOptions, validate};
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::config::RegistryConfig;
use crate::helpers::{format_entry, init_tracing, load_analysis};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { .. } => init_tracing("info"),
        _ => init_tracing("warn"),
    }

    let config = config::resolve(cli.root, cli.registry);

    match cli.command {
        Commands::Index { response, dry_run } => cmd_index(&config, &response, dry_run),
        Commands::Search {
            query,
            kind,
            limit,
            scores,
        } => cmd_search(&config, &query, kind, limit, scores),
        Commands::List { kind } => cmd_list(&config, kind),
        Commands::Get { name } => cmd_get(&config, &name),
        Commands::Tree { response } => cmd_tree(&response),
        Commands::Validate { response } => cmd_validate(&response),
    }
}

fn open_registry(config: &RegistryConfig) -> Registry {
    Registry::at_path(&config.registry_path())
}

// ---------------------------------------------------------------------------
// Subcommand: index
// ---------------------------------------------------------------------------

fn cmd_index(config: &RegistryConfig, response: &std::path::Path, dry_run: bool) -> Result<()> {
    let analysis = load_analysis(response)?;

    let report = validate(&analysis.skills, &analysis.agents);
    for issue in &report.issues {
        warn!(%issue, "analysis reference issue");
    }

    let registry = open_registry(config).with_dry_run(dry_run);
    let entries = registry
        .build(&analysis.skills, &analysis.agents)
        .context("failed to build registry")?;

    let path = config.registry_path();
    info!(entries = entries.len(), dry_run, "index complete");

    println!();
    if dry_run {
        println!("  Dry run: {} entries would be written to {}", entries.len(), path.display());
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
    } else {
        println!("  Indexed {} entries into {}", entries.len(), path.display());
    }
    println!("    Skills: {}", analysis.skills.len());
    println!("    Agents: {}", analysis.agents.len());
    if !report.is_valid() {
        println!("    Reference issues: {} (run `skillsmith validate`)", report.issues.len());
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: search
// ---------------------------------------------------------------------------

fn cmd_search(
    config: &RegistryConfig,
    query: &str,
    kind: Option<EntryKind>,
    limit: Option<usize>,
    scores: bool,
) -> Result<()> {
    let options = SearchOptions {
        kind,
        limit: limit.unwrap_or(config.default_limit),
    };
    let results = open_registry(config).search_scored(query, &options);

    if results.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    for (entry, score) in &results {
        if scores {
            println!("{:>5} {}", score, format_entry(entry).trim_start());
        } else {
            println!("{}", format_entry(entry));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: list
// ---------------------------------------------------------------------------

fn cmd_list(config: &RegistryConfig, kind: Option<EntryKind>) -> Result<()> {
    let entries: Vec<_> = open_registry(config)
        .list()
        .into_iter()
        .filter(|entry| kind.is_none_or(|kind| entry.kind == kind))
        .collect();

    if entries.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    println!();
    println!("  {} entries", entries.len());

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: get
// ---------------------------------------------------------------------------

fn cmd_get(config: &RegistryConfig, name: &str) -> Result<()> {
    match open_registry(config).get(name) {
        Some(entry) => {
            let json =
                serde_json::to_string_pretty(&entry).context("failed to format entry")?;
            println!("{json}");
        }
        None => println!("Entry `{name}` not found."),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: tree
// ---------------------------------------------------------------------------

fn cmd_tree(response: &std::path::Path) -> Result<()> {
    let analysis = load_analysis(response)?;
    let forest = AgentForest::build(&analysis.agents);

    if forest.is_empty() {
        println!("No agents found.");
        return Ok(());
    }

    print!("{}", forest.render_tree());
    for cycle in forest.cycles() {
        println!("  cycle (not shown above): {}", cycle.join(" -> "));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: validate
// ---------------------------------------------------------------------------

fn cmd_validate(response: &std::path::Path) -> Result<()> {
    let analysis = load_analysis(response)?;
    let report = validate(&analysis.skills, &analysis.agents);

    if report.is_valid() {
        println!(
            "  OK: {} skills, {} agents, no reference issues",
            analysis.skills.len(),
            analysis.agents.len()
        );
        return Ok(());
    }

    for issue in &report.issues {
        println!("  [!] {issue}");
    }
    bail!("{} reference issue(s) found", report.issues.len())
}
