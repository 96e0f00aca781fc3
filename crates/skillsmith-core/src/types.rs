//! Record and entry types.
//!
//! Records are what the normalizer produces from an analysis response: one
//! [`SkillRecord`] per extracted skill and one [`AgentRecord`] per agent node,
//! with the agent hierarchy expressed purely by name reference.  Entries are
//! the flat projection of either record kind that the registry stores and
//! searches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Directory (relative to the repository root) that holds generated skills.
pub const SKILLS_DIR: &str = ".github/skills";

/// Directory (relative to the repository root) that holds generated agents.
pub const AGENTS_DIR: &str = ".github/agents";

/// A skill extracted from the analyzed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    /// Short identifier, unique within one analysis run by convention only.
    pub name: String,

    /// Free-text description.
    pub description: String,

    /// Advisory path hint pointing at the code the skill was derived from.
    #[serde(default)]
    pub source_directory: String,

    #[serde(default)]
    pub patterns: Vec<String>,

    /// Phrases that should surface this skill in a search.
    #[serde(default)]
    pub triggers: Vec<String>,

    #[serde(default)]
    pub examples: Vec<String>,

    /// Category label.  Usually one of the [`SkillCategory`] labels, but kept
    /// verbatim so unknown labels survive a round trip.
    pub category: String,
}

impl SkillRecord {
    /// Resolve the category label, if it is one of the known ones.
    pub fn category_kind(&self) -> Option<SkillCategory> {
        self.category.parse().ok()
    }
}

/// Closed set of skill categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillCategory {
    Architecture,
    Reliability,
    Quality,
    Security,
    Patterns,
}

impl SkillCategory {
    /// All categories, in display order.
    pub const ALL: [SkillCategory; 5] = [
        Self::Architecture,
        Self::Reliability,
        Self::Quality,
        Self::Security,
        Self::Patterns,
    ];

    /// The lowercase label used in records and registry entries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::Reliability => "reliability",
            Self::Quality => "quality",
            Self::Security => "security",
            Self::Patterns => "patterns",
        }
    }

    /// Human-readable description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Architecture => "Structural conventions and module boundaries",
            Self::Reliability => "Error handling, retries and failure recovery",
            Self::Quality => "Testing, linting and code quality practices",
            Self::Security => "Authentication, secrets and input validation",
            Self::Patterns => "Recurring implementation patterns",
        }
    }

    /// Describe an arbitrary label, falling back to a generic description
    /// for labels outside the closed set.
    pub fn describe(label: &str) -> &'static str {
        label
            .parse::<Self>()
            .map_or("General development knowledge", |c| c.description())
    }
}

impl FromStr for SkillCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown skill category `{s}`"))
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An externally runnable command an agent may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub command: String,
    pub description: String,
}

/// An agent descriptor after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub name: String,

    pub description: String,

    #[serde(default)]
    pub triggers: Vec<String>,

    /// Names of skills this agent relies on.  Soft references: nothing checks
    /// them at write time (see [`crate::hierarchy::validate`]).
    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub tools: Vec<ToolSpec>,

    /// `false` marks a root-like agent at the top of its hierarchy.
    #[serde(default)]
    pub is_sub_agent: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_agent: Option<String>,

    /// Names of child agents, both nested and referenced ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_agents: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<String>,
}

impl AgentRecord {
    /// Whether this agent sits at the top of its hierarchy.
    pub fn is_root(&self) -> bool {
        !self.is_sub_agent
    }
}

/// Kind of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Skill,
    Agent,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Agent => "agent",
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skill" | "skills" => Ok(Self::Skill),
            "agent" | "agents" => Ok(Self::Agent),
            other => Err(format!("unknown entry type `{other}` (expected skill or agent)")),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the registry file: the searchable projection of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,

    pub name: String,

    /// Path of the generated artifact, relative to the repository root.
    pub file: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub triggers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_agent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_agents: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sub_agent: Option<bool>,
}

impl RegistryEntry {
    /// A root-level agent: an agent entry whose `isSubAgent` is absent or false.
    pub fn is_root_agent(&self) -> bool {
        self.kind == EntryKind::Agent && !self.is_sub_agent.unwrap_or(false)
    }
}

impl From<&SkillRecord> for RegistryEntry {
    fn from(skill: &SkillRecord) -> Self {
        Self {
            kind: EntryKind::Skill,
            name: skill.name.clone(),
            file: format!("{SKILLS_DIR}/{}/SKILL.md", skill.name),
            description: skill.description.clone(),
            category: Some(skill.category.clone()),
            triggers: skill.triggers.clone(),
            parent_agent: None,
            sub_agents: None,
            is_sub_agent: None,
        }
    }
}

impl From<&AgentRecord> for RegistryEntry {
    fn from(agent: &AgentRecord) -> Self {
        Self {
            kind: EntryKind::Agent,
            name: agent.name.clone(),
            file: format!("{AGENTS_DIR}/{}/agent.yaml", agent.name),
            description: agent.description.clone(),
            category: None,
            triggers: agent.triggers.clone(),
            parent_agent: agent.parent_agent.clone(),
            sub_agents: agent.sub_agents.clone(),
            is_sub_agent: Some(agent.is_sub_agent),
        }
    }
}

/// The normalized content of one analysis response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub skills: Vec<SkillRecord>,
    /// Flattened agents, parents before their children.
    pub agents: Vec<AgentRecord>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
