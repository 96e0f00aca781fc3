//! Local skill/agent registry — build, search, list, and look up entries.
//!
//! The registry is a newline-delimited JSON file holding one
//! [`RegistryEntry`] per generated skill or agent.  It is rebuilt from the
//! full record set on every analysis run and read back whole for every
//! query; there is no index and no cache.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use skillsmith_core::{MemoryStorage, Registry, SearchOptions};
//!
//! let registry = Registry::new(Arc::new(MemoryStorage::new()));
//! registry.build(&[], &[]).unwrap();
//! assert!(registry.search("auth", &SearchOptions::default()).is_empty());
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, SkillsmithError};
use crate::storage::{FileStorage, MemoryStorage, RegistryStorage};
use crate::types::{AgentRecord, EntryKind, RegistryEntry, SkillRecord};

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

// Scoring weights.
const SCORE_NAME_EXACT: u32 = 100;
const SCORE_NAME_CONTAINS: u32 = 50;
const SCORE_DESCRIPTION: u32 = 30;
const SCORE_TRIGGER_CONTAINS: u32 = 20;
const SCORE_TRIGGER_EXACT: u32 = 40;
const SCORE_CATEGORY: u32 = 10;
const SCORE_ROOT_AGENT: u32 = 5;

/// Options for [`Registry::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Restrict results to one entry kind.
    pub kind: Option<EntryKind>,
    /// Maximum number of results.
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            kind: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchOptions {
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Project skills and agents into registry entries, skills first, each in
/// input order.
pub fn project_entries(skills: &[SkillRecord], agents: &[AgentRecord]) -> Vec<RegistryEntry> {
    skills
        .iter()
        .map(RegistryEntry::from)
        .chain(agents.iter().map(RegistryEntry::from))
        .collect()
}

/// Relevance of `entry` for an already-lowercased query.
pub fn score_entry(entry: &RegistryEntry, query: &str) -> u32 {
    let mut score = 0;

    let name = entry.name.to_lowercase();
    if name == query {
        score += SCORE_NAME_EXACT;
    }
    if name.contains(query) {
        score += SCORE_NAME_CONTAINS;
    }

    if entry.description.to_lowercase().contains(query) {
        score += SCORE_DESCRIPTION;
    }

    let triggers: Vec<String> = entry.triggers.iter().map(|t| t.to_lowercase()).collect();
    if triggers.iter().any(|t| t.contains(query)) {
        score += SCORE_TRIGGER_CONTAINS;
        if triggers.iter().any(|t| t == query) {
            score += SCORE_TRIGGER_EXACT;
        }
    }

    if entry
        .category
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains(query))
    {
        score += SCORE_CATEGORY;
    }

    if entry.is_root_agent() {
        score += SCORE_ROOT_AGENT;
    }

    score
}

/// Serialize entries as newline-delimited JSON with a trailing newline.
pub fn encode_entries(entries: &[RegistryEntry]) -> Result<String> {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&serde_json::to_string(entry)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parse newline-delimited JSON.  Blank lines are skipped; any malformed
/// line fails the whole decode.
pub fn decode_entries(contents: &str) -> Result<Vec<RegistryEntry>> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(SkillsmithError::from))
        .collect()
}

/// Keyword registry over generated skills and agents.
#[derive(Clone)]
pub struct Registry {
    storage: Arc<dyn RegistryStorage>,
    dry_run: bool,
}

impl Registry {
    /// Create a registry over the given storage.
    pub fn new(storage: Arc<dyn RegistryStorage>) -> Self {
        Self {
            storage,
            dry_run: false,
        }
    }

    /// Registry file at the default location under a repository root.
    pub fn open(root: &Path) -> Self {
        Self::new(Arc::new(FileStorage::at_root(root)))
    }

    /// Registry file at an explicit path.
    pub fn at_path(path: &Path) -> Self {
        Self::new(Arc::new(FileStorage::new(path)))
    }

    /// Registry held in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// In dry-run mode [`build`](Self::build) computes entries but never writes.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn storage(&self) -> &Arc<dyn RegistryStorage> {
        &self.storage
    }

    /// Rebuild the registry from one run's full record set, replacing any
    /// previous contents.  Returns the entries that were (or in dry-run
    /// mode, would have been) written.
    pub fn build(
        &self,
        skills: &[SkillRecord],
        agents: &[AgentRecord],
    ) -> Result<Vec<RegistryEntry>> {
        let entries = project_entries(skills, agents);
        let contents = encode_entries(&entries)?;
        let location = self.storage.location();

        if self.dry_run {
            tracing::info!(
                entries = entries.len(),
                path = %location.display(),
                "dry run, registry not written"
            );
            return Ok(entries);
        }

        self.storage
            .write(&contents)
            .map_err(|source| SkillsmithError::RegistryWrite {
                path: location.clone(),
                source,
            })?;

        tracing::info!(
            skills = skills.len(),
            agents = agents.len(),
            path = %location.display(),
            "registry built"
        );
        Ok(entries)
    }

    /// Every entry in file order.  An absent or unreadable registry, or one
    /// with any malformed line, reads as empty.
    pub fn list(&self) -> Vec<RegistryEntry> {
        let location = self.storage.location();
        let contents = match self.storage.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    path = %location.display(),
                    error = %e,
                    "failed to read registry, treating as empty"
                );
                return Vec::new();
            }
        };

        match decode_entries(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %location.display(),
                    error = %e,
                    "malformed registry, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Ranked search returning entries only.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<RegistryEntry> {
        self.search_scored(query, options)
            .into_iter()
            .map(|(entry, _)| entry)
            .collect()
    }

    /// Ranked search returning each entry with its score.
    ///
    /// Entries scoring zero are dropped; ties keep file order.
    pub fn search_scored(&self, query: &str, options: &SearchOptions) -> Vec<(RegistryEntry, u32)> {
        let query = query.to_lowercase();

        let mut scored: Vec<(RegistryEntry, u32)> = self
            .list()
            .into_iter()
            .filter(|entry| options.kind.is_none_or(|kind| entry.kind == kind))
            .map(|entry| {
                let score = score_entry(&entry, &query);
                (entry, score)
            })
            .filter(|(_, score)| *score > 0)
            .collect();

        // `sort_by` is stable, which keeps file order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(options.limit);

        tracing::debug!(query = %query, results = scored.len(), "registry search");
        scored
    }

    /// First entry whose name matches exactly, scanning a fresh [`list`](Self::list).
    pub fn get(&self, name: &str) -> Option<RegistryEntry> {
        self.list().into_iter().find(|entry| entry.name == name)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("location", &self.storage.location())
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, description: &str, triggers: &[&str], category: &str) -> SkillRecord {
        SkillRecord {
            name: name.into(),
            description: description.into(),
            source_directory: String::new(),
            patterns: Vec::new(),
            triggers: triggers.iter().map(|t| (*t).to_owned()).collect(),
            examples: Vec::new(),
            category: category.into(),
        }
    }

    fn agent(name: &str, description: &str, parent: Option<&str>) -> AgentRecord {
        AgentRecord {
            name: name.into(),
            description: description.into(),
            triggers: Vec::new(),
            skills: Vec::new(),
            tools: Vec::new(),
            is_sub_agent: parent.is_some(),
            parent_agent: parent.map(str::to_owned),
            sub_agents: None,
            source_directory: None,
        }
    }

    fn names(entries: &[RegistryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn scoring_weights() {
        let entry = RegistryEntry::from(&skill("auth", "auth helpers", &["auth"], "security"));
        // exact name + contains + description + trigger exact
        assert_eq!(score_entry(&entry, "auth"), 100 + 50 + 30 + 20 + 40);
        assert_eq!(score_entry(&entry, "secu"), 10);
        assert_eq!(score_entry(&entry, "zzz"), 0);

        let root = RegistryEntry::from(&agent("root", "", None));
        assert_eq!(score_entry(&root, "zzz"), 5);
        let child = RegistryEntry::from(&agent("child", "", Some("root")));
        assert_eq!(score_entry(&child, "zzz"), 0);
    }

    #[test]
    fn scoring_is_case_insensitive() {
        let entry = RegistryEntry::from(&skill("OAuth-Flow", "Handles OAuth", &["Login"], "Security"));
        assert_eq!(score_entry(&entry, "oauth"), 50 + 30);
        assert_eq!(score_entry(&entry, "login"), 20 + 40);
        assert_eq!(score_entry(&entry, "security"), 10);
    }

    #[test]
    fn trigger_points_count_once() {
        let entry = RegistryEntry::from(&skill("x", "", &["api", "api", "rest api"], "patterns"));
        assert_eq!(score_entry(&entry, "api"), 20 + 40);
    }

    #[test]
    fn exact_name_ranks_above_substring() {
        let registry = Registry::in_memory();
        registry
            .build(
                &[
                    skill("oauth-flow", "", &[], "security"),
                    skill("auth", "", &[], "security"),
                ],
                &[],
            )
            .unwrap();
        let results = registry.search("auth", &SearchOptions::default());
        assert_eq!(names(&results), ["auth", "oauth-flow"]);
    }

    #[test]
    fn ties_keep_file_order() {
        let registry = Registry::in_memory();
        registry
            .build(
                &[
                    skill("b-cache", "", &[], "patterns"),
                    skill("a-cache", "", &[], "patterns"),
                    skill("c-cache", "", &[], "patterns"),
                ],
                &[],
            )
            .unwrap();
        let results = registry.search("cache", &SearchOptions::default());
        assert_eq!(names(&results), ["b-cache", "a-cache", "c-cache"]);
    }

    #[test]
    fn type_filter_and_limit() {
        let skills: Vec<_> = (0..5)
            .map(|i| skill(&format!("api-skill-{i}"), "", &[], "patterns"))
            .collect();
        let agents: Vec<_> = (0..5)
            .map(|i| agent(&format!("api-agent-{i}"), "", Some("root")))
            .collect();
        let registry = Registry::in_memory();
        registry.build(&skills, &agents).unwrap();

        let results = registry.search("api", &SearchOptions::default().kind(EntryKind::Agent).limit(3));
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|e| e.kind == EntryKind::Agent));

        let all = registry.search("api", &SearchOptions::default());
        assert_eq!(all.len(), DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn root_agent_bonus_breaks_ties() {
        let registry = Registry::in_memory();
        registry
            .build(
                &[],
                &[agent("deploy-worker", "", Some("root")), agent("deploy", "", None)],
            )
            .unwrap();
        let scored = registry.search_scored("deploy", &SearchOptions::default());
        assert_eq!(scored[0].0.name, "deploy");
        assert_eq!(scored[0].1, 100 + 50 + 5);
        assert_eq!(scored[1].1, 50);
    }

    #[test]
    fn build_then_list_round_trips() {
        let skills = [skill("retry", "Retry policy", &["retry"], "reliability")];
        let mut root = agent("root", "Orchestrator", None);
        root.sub_agents = Some(vec!["api".into()]);
        let agents = [root, agent("api", "API", Some("root"))];

        let registry = Registry::in_memory();
        let built = registry.build(&skills, &agents).unwrap();

        assert_eq!(registry.list(), project_entries(&skills, &agents));
        assert_eq!(registry.list(), built);
    }

    #[test]
    fn build_writes_one_line_per_entry() {
        let storage = Arc::new(MemoryStorage::new());
        let registry = Registry::new(storage.clone());
        registry
            .build(&[skill("a", "", &[], "quality")], &[agent("b", "", None)])
            .unwrap();

        let contents = storage.contents().unwrap();
        assert!(contents.ends_with('\n'));
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""type":"skill""#));
        assert!(lines[1].contains(r#""file":".github/agents/b/agent.yaml""#));
    }

    #[test]
    fn build_replaces_previous_contents() {
        let registry = Registry::in_memory();
        registry.build(&[skill("old", "", &[], "quality")], &[]).unwrap();
        registry.build(&[skill("new", "", &[], "quality")], &[]).unwrap();
        assert_eq!(names(&registry.list()), ["new"]);
    }

    #[test]
    fn dry_run_does_not_write() {
        let storage = Arc::new(MemoryStorage::new());
        let registry = Registry::new(storage.clone()).with_dry_run(true);
        let entries = registry.build(&[skill("a", "", &[], "quality")], &[]).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(storage.contents(), None);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn empty_registry_reads_empty() {
        let registry = Registry::in_memory();
        assert!(registry.list().is_empty());
        assert!(registry.search("anything", &SearchOptions::default()).is_empty());
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn malformed_line_reads_as_empty() {
        let contents = concat!(
            r#"{"type":"skill","name":"ok","file":"f","description":"","triggers":[]}"#,
            "\nnot json\n"
        );
        let registry = Registry::new(Arc::new(MemoryStorage::with_contents(contents)));
        assert!(registry.list().is_empty());
        assert!(registry.get("ok").is_none());
    }

    #[test]
    fn get_returns_first_match() {
        let registry = Registry::in_memory();
        registry
            .build(&[skill("dup", "first", &[], "quality")], &[agent("dup", "second", None)])
            .unwrap();
        let entry = registry.get("dup").unwrap();
        assert_eq!(entry.kind, EntryKind::Skill);
        assert_eq!(entry.description, "first");
    }

    #[test]
    fn decode_skips_blank_lines() {
        let contents = "\n{\"type\":\"agent\",\"name\":\"a\",\"file\":\"f\"}\n\n";
        let entries = decode_entries(contents).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn encode_empty_is_empty_string() {
        assert_eq!(encode_entries(&[]).unwrap(), "");
    }
}
