//! Core of skillsmith — turns a repository analysis response into a
//! searchable registry of generated skills and agents.
//!
//! This crate provides:
//!
//! - **Response extraction** — clips the JSON object out of a free-text
//!   analysis response ([`parse_analysis_response`]).
//!
//! - **Normalizer** — flattens loosely-typed, possibly nested agent nodes into
//!   flat [`AgentRecord`]s linked by name ([`normalize_agents`]).  Never fails
//!   on malformed input.
//!
//! - **Registry** — rebuilds a newline-delimited JSON index from one run's
//!   records and answers weighted keyword searches ([`Registry`]).
//!
//! - **Hierarchy validator** — rebuilds the agent forest explicitly and
//!   reports dangling references and parent cycles ([`validate`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use skillsmith_core::{Registry, SearchOptions, parse_analysis_response};
//!
//! let response = std::fs::read_to_string("analysis.txt").unwrap();
//! let analysis = parse_analysis_response(&response).unwrap();
//!
//! let registry = Registry::open(Path::new("."));
//! registry.build(&analysis.skills, &analysis.agents).unwrap();
//!
//! for entry in registry.search("auth", &SearchOptions::default()) {
//!     println!("{} {}", entry.kind, entry.name);
//! }
//! ```

pub mod error;
pub mod extract;
pub mod hierarchy;
pub mod normalizer;
pub mod registry;
pub mod storage;
pub mod types;

pub use error::{Result, SkillsmithError};
pub use extract::{extract_json_span, parse_analysis_response};
pub use hierarchy::{AgentForest, ValidationIssue, ValidationReport, validate};
pub use normalizer::{normalize_agent, normalize_agents, normalize_skills, normalize_tool};
pub use registry::{
    DEFAULT_SEARCH_LIMIT, Registry, SearchOptions, project_entries, score_entry,
};
pub use storage::{DEFAULT_REGISTRY_PATH, FileStorage, MemoryStorage, RegistryStorage};
pub use types::{
    AgentRecord, AnalysisResult, EntryKind, RegistryEntry, SkillCategory, SkillRecord, ToolSpec,
};
