//! Agent hierarchy reconstruction and reference validation.
//!
//! The normalizer keeps the agent hierarchy only as name references, and
//! nothing stops a malformed analysis response from producing dangling
//! parents, references to skills that were never extracted, or a
//! `parentAgent` cycle.  [`AgentForest`] rebuilds the hierarchy explicitly
//! and [`validate`] reports what is wrong with it.  Neither mutates or
//! reorders the records they are given.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::types::{AgentRecord, SkillRecord};

/// Explicit parent/child index over a flat agent list.
///
/// Records are keyed by name; when a name repeats, the first record wins and
/// later ones are listed in [`duplicates`](Self::duplicates).
#[derive(Debug)]
pub struct AgentForest<'a> {
    nodes: Vec<&'a AgentRecord>,
    index: HashMap<&'a str, usize>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    duplicates: Vec<&'a str>,
}

impl<'a> AgentForest<'a> {
    pub fn build(agents: &'a [AgentRecord]) -> Self {
        let mut nodes = Vec::with_capacity(agents.len());
        let mut index = HashMap::with_capacity(agents.len());
        let mut duplicates = Vec::new();

        for agent in agents {
            if index.contains_key(agent.name.as_str()) {
                duplicates.push(agent.name.as_str());
                continue;
            }
            index.insert(agent.name.as_str(), nodes.len());
            nodes.push(agent);
        }

        let parent: Vec<Option<usize>> = nodes
            .iter()
            .map(|agent| {
                agent
                    .parent_agent
                    .as_deref()
                    .and_then(|p| index.get(p).copied())
            })
            .collect();

        let mut children = vec![Vec::new(); nodes.len()];
        for (child, p) in parent.iter().enumerate() {
            if let Some(p) = *p {
                children[p].push(child);
            }
        }

        Self {
            nodes,
            index,
            parent,
            children,
            duplicates,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&'a AgentRecord> {
        self.index.get(name).map(|&i| self.nodes[i])
    }

    /// Names that appeared more than once (each extra occurrence listed).
    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }

    /// Root-like agents (`isSubAgent == false`), in input order.
    pub fn roots(&self) -> Vec<&'a AgentRecord> {
        self.nodes.iter().copied().filter(|a| a.is_root()).collect()
    }

    /// Direct children of `name` derived from `parentAgent` links.
    pub fn children_of(&self, name: &str) -> Vec<&'a AgentRecord> {
        self.index
            .get(name)
            .map(|&i| self.children[i].iter().map(|&c| self.nodes[c]).collect())
            .unwrap_or_default()
    }

    /// Parent of `name`, if its `parentAgent` resolves to a known agent.
    pub fn parent_of(&self, name: &str) -> Option<&'a AgentRecord> {
        let &i = self.index.get(name)?;
        self.parent[i].map(|p| self.nodes[p])
    }

    /// Every `parentAgent` cycle, each as the list of names on it, starting
    /// from the member that appears first in the input.
    pub fn cycles(&self) -> Vec<Vec<&'a str>> {
        // 0 = unvisited, 1 = on the current walk, 2 = finished
        let mut state = vec![0u8; self.nodes.len()];
        let mut cycles = Vec::new();

        for start in 0..self.nodes.len() {
            if state[start] != 0 {
                continue;
            }

            let mut walk = Vec::new();
            let mut current = Some(start);
            while let Some(i) = current {
                match state[i] {
                    0 => {
                        state[i] = 1;
                        walk.push(i);
                        current = self.parent[i];
                    }
                    1 => {
                        // `i` is on this walk: everything from it onward loops.
                        let from = walk.iter().position(|&w| w == i).unwrap_or(0);
                        let mut members: Vec<usize> = walk[from..].to_vec();
                        let first = members.iter().copied().min().unwrap_or(i);
                        let shift = members.iter().position(|&m| m == first).unwrap_or(0);
                        members.rotate_left(shift);
                        cycles.push(members.into_iter().map(|m| self.name(m)).collect());
                        break;
                    }
                    _ => break,
                }
            }

            for i in walk {
                state[i] = 2;
            }
        }

        cycles
    }

    /// Indented text rendering, one agent per line.  Agents reachable only
    /// through a cycle are not rendered.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        let mut seen = HashSet::new();
        for (i, agent) in self.nodes.iter().enumerate() {
            if agent.is_root() || self.parent[i].is_none() {
                self.render_node(i, 0, &mut seen, &mut out);
            }
        }
        out
    }

    fn render_node(&self, i: usize, depth: usize, seen: &mut HashSet<usize>, out: &mut String) {
        if !seen.insert(i) {
            return;
        }
        let agent = self.nodes[i];
        out.push_str(&"  ".repeat(depth));
        out.push_str(&agent.name);
        if !agent.is_root() && self.parent[i].is_none() {
            out.push_str(" (detached)");
        }
        out.push('\n');
        for &child in &self.children[i] {
            self.render_node(child, depth + 1, seen, out);
        }
    }

    fn name(&self, i: usize) -> &'a str {
        self.nodes[i].name.as_str()
    }
}

/// A problem found in a normalized record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DuplicateSkill { name: String },
    DuplicateAgent { name: String },
    /// `parentAgent` names an agent that does not exist.
    UnknownParent { agent: String, parent: String },
    /// A `subAgents` entry names an agent that does not exist.
    UnknownSubAgent { agent: String, sub_agent: String },
    /// A `skills` entry names a skill that does not exist.
    UnknownSkill { agent: String, skill: String },
    /// Marked as a sub-agent but has no `parentAgent`.
    OrphanSubAgent { agent: String },
    /// Agents whose `parentAgent` links loop back on themselves.
    Cycle { agents: Vec<String> },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSkill { name } => write!(f, "duplicate skill `{name}`"),
            Self::DuplicateAgent { name } => write!(f, "duplicate agent `{name}`"),
            Self::UnknownParent { agent, parent } => {
                write!(f, "agent `{agent}` has unknown parent `{parent}`")
            }
            Self::UnknownSubAgent { agent, sub_agent } => {
                write!(f, "agent `{agent}` lists unknown sub-agent `{sub_agent}`")
            }
            Self::UnknownSkill { agent, skill } => {
                write!(f, "agent `{agent}` references unknown skill `{skill}`")
            }
            Self::OrphanSubAgent { agent } => {
                write!(f, "sub-agent `{agent}` has no parent")
            }
            Self::Cycle { agents } => write!(f, "parent cycle: {}", agents.join(" -> ")),
        }
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check references between skills and agents.
pub fn validate(skills: &[SkillRecord], agents: &[AgentRecord]) -> ValidationReport {
    let mut issues = Vec::new();

    let mut skill_names = HashSet::new();
    for skill in skills {
        if !skill_names.insert(skill.name.as_str()) {
            issues.push(ValidationIssue::DuplicateSkill {
                name: skill.name.clone(),
            });
        }
    }

    let forest = AgentForest::build(agents);
    issues.extend(
        forest
            .duplicates()
            .iter()
            .map(|name| ValidationIssue::DuplicateAgent {
                name: (*name).to_owned(),
            }),
    );

    for agent in agents {
        match agent.parent_agent.as_deref() {
            Some(parent) if forest.get(parent).is_none() => {
                issues.push(ValidationIssue::UnknownParent {
                    agent: agent.name.clone(),
                    parent: parent.to_owned(),
                });
            }
            None if agent.is_sub_agent => {
                issues.push(ValidationIssue::OrphanSubAgent {
                    agent: agent.name.clone(),
                });
            }
            _ => {}
        }

        for sub_agent in agent.sub_agents.iter().flatten() {
            if forest.get(sub_agent).is_none() {
                issues.push(ValidationIssue::UnknownSubAgent {
                    agent: agent.name.clone(),
                    sub_agent: sub_agent.clone(),
                });
            }
        }

        for skill in &agent.skills {
            if !skill_names.contains(skill.as_str()) {
                issues.push(ValidationIssue::UnknownSkill {
                    agent: agent.name.clone(),
                    skill: skill.clone(),
                });
            }
        }
    }

    issues.extend(forest.cycles().into_iter().map(|cycle| ValidationIssue::Cycle {
        agents: cycle.into_iter().map(str::to_owned).collect(),
    }));

    for issue in &issues {
        tracing::debug!(%issue, "validation issue");
    }

    ValidationReport { issues }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
