//! Analysis-response normalizer.
//!
//! The analysis step returns loosely-typed JSON whose agent nodes may embed
//! their children in `subAgents`, either as bare name strings or as complete
//! nested agent objects:
//!
//! ```text
//! {
//!   "name": "root",
//!   "tools": ["npm test", {"name": "lint", "command": "npm run lint"}],
//!   "subAgents": [
//!     "docs",
//!     {"name": "api", "subAgents": [{"name": "api-auth"}]}
//!   ]
//! }
//! ```
//!
//! Normalization flattens such a tree into a single list of [`AgentRecord`]s,
//! parents before children (depth-first, pre-order), with the hierarchy kept
//! only as name references (`parentAgent`, `subAgents`).  The example above
//! yields `root`, `api`, `api-auth`; `docs` is a reference only.
//!
//! Nothing here fails: missing or wrongly-typed fields degrade to defaults.

use serde_json::{Map, Value};

use crate::types::{AgentRecord, SkillRecord, ToolSpec};

/// Name given to any node without a usable `name`.
pub const UNKNOWN_NAME: &str = "unknown";

/// Category given to skills without a usable `category`.
pub const DEFAULT_CATEGORY: &str = "patterns";

/// Shape of a raw JSON value as far as the normalizer cares.
#[derive(Debug, Clone, Copy)]
enum RawNode<'a> {
    /// A bare string: a sub-agent name reference or a tool command line.
    Text(&'a str),
    /// An object carrying a `name` key.
    Named(&'a Map<String, Value>),
    /// An object without a `name` key.
    Object(&'a Map<String, Value>),
    /// Anything else (numbers, booleans, arrays, null).
    Other,
}

impl<'a> RawNode<'a> {
    fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Object(map) if map.contains_key("name") => Self::Named(map),
            Value::Object(map) => Self::Object(map),
            _ => Self::Other,
        }
    }
}

/// Normalize a list of raw agent nodes into flat records.
///
/// Each top-level node is emitted followed by all of its nested descendants;
/// sibling order is preserved and duplicate names are kept.
pub fn normalize_agents(raw: &[Value]) -> Vec<AgentRecord> {
    let mut out = Vec::with_capacity(raw.len());
    for node in raw {
        flatten_agent(as_object(node), None, &mut out);
    }
    tracing::debug!(input = raw.len(), output = out.len(), "normalized agents");
    out
}

/// Normalize a single raw agent node (and its nested children).
pub fn normalize_agent(raw: &Value) -> Vec<AgentRecord> {
    normalize_agents(std::slice::from_ref(raw))
}

/// Normalize a list of raw skill nodes.
pub fn normalize_skills(raw: &[Value]) -> Vec<SkillRecord> {
    raw.iter()
        .map(|node| {
            let map = as_object(node);
            SkillRecord {
                name: name_of(map),
                description: string_field(map, "description"),
                source_directory: string_field(map, "sourceDirectory"),
                patterns: string_list(map, "patterns"),
                triggers: string_list(map, "triggers"),
                examples: string_list(map, "examples"),
                category: map
                    .get("category")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_CATEGORY)
                    .to_owned(),
            }
        })
        .collect()
}

/// Normalize one tool entry.  Returns `None` for values that are neither a
/// command string nor an object.
pub fn normalize_tool(raw: &Value) -> Option<ToolSpec> {
    match RawNode::classify(raw) {
        RawNode::Text(command) => {
            let name = command
                .split_whitespace()
                .next()
                .unwrap_or(UNKNOWN_NAME)
                .to_owned();
            Some(ToolSpec {
                name,
                command: command.to_owned(),
                description: command.to_owned(),
            })
        }
        RawNode::Named(map) | RawNode::Object(map) => Some(ToolSpec {
            name: name_of(map),
            command: string_field(map, "command"),
            description: string_field(map, "description"),
        }),
        RawNode::Other => None,
    }
}

fn flatten_agent(map: &Map<String, Value>, parent: Option<&str>, out: &mut Vec<AgentRecord>) {
    let name = name_of(map);

    let mut nested = Vec::new();
    let sub_agents = map.get("subAgents").and_then(Value::as_array).map(|items| {
        let mut names = Vec::with_capacity(items.len());
        for item in items {
            match RawNode::classify(item) {
                RawNode::Text(reference) => names.push(reference.to_owned()),
                RawNode::Named(child) => {
                    names.push(name_of(child));
                    nested.push(child);
                }
                RawNode::Object(_) | RawNode::Other => {
                    tracing::debug!(agent = %name, "ignoring sub-agent entry without a name");
                }
            }
        }
        names
    });

    let (is_sub_agent, parent_agent) = match parent {
        Some(parent) => (true, Some(parent.to_owned())),
        None => (
            map.get("isSubAgent").and_then(Value::as_bool).unwrap_or(false),
            map.get("parentAgent")
                .and_then(Value::as_str)
                .map(str::to_owned),
        ),
    };

    let tools = map
        .get("tools")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_tool).collect())
        .unwrap_or_default();

    out.push(AgentRecord {
        name: name.clone(),
        description: string_field(map, "description"),
        triggers: string_list(map, "triggers"),
        skills: string_list(map, "skills"),
        tools,
        is_sub_agent,
        parent_agent,
        sub_agents,
        source_directory: map
            .get("sourceDirectory")
            .and_then(Value::as_str)
            .map(str::to_owned),
    });

    for child in nested {
        flatten_agent(child, Some(name.as_str()), out);
    }
}

/// View a value as an object, treating anything else as an empty one.
fn as_object(value: &Value) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    value
        .as_object()
        .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
}

fn name_of(map: &Map<String, Value>) -> String {
    map.get("name")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_NAME)
        .to_owned()
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Collect the string elements of an array field; non-strings are dropped.
fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
