//! Analysis response extraction.
//!
//! The analysis step answers in free text that contains a JSON object
//! somewhere inside it (often wrapped in prose or a code fence).  This module
//! clips the object out, parses it, and runs both of its arrays through the
//! [`normalizer`](crate::normalizer).

use serde_json::Value;

use crate::error::{Result, SkillsmithError};
use crate::normalizer::{normalize_agents, normalize_skills};
use crate::types::AnalysisResult;

/// Return the span from the first `{` to the last `}` in `text`, inclusive.
///
/// The match is greedy: braces inside the span are not balanced, so prose
/// after the object that happens to contain a `}` is swept in and the parse
/// that follows will fail.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a raw analysis response into normalized records.
///
/// Fails only when no JSON object can be recovered from `text`.  Once the
/// object parses, every field is handled fail-soft: missing `skills` or
/// `agents` arrays simply yield empty lists.
pub fn parse_analysis_response(text: &str) -> Result<AnalysisResult> {
    let span = extract_json_span(text).ok_or_else(|| {
        SkillsmithError::MalformedResponse("no JSON object found in response".into())
    })?;

    let value: Value = serde_json::from_str(span)
        .map_err(|e| SkillsmithError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let skills = value
        .get("skills")
        .and_then(Value::as_array)
        .map(|raw| normalize_skills(raw))
        .unwrap_or_default();

    let agents = value
        .get("agents")
        .and_then(Value::as_array)
        .map(|raw| normalize_agents(raw))
        .unwrap_or_default();

    tracing::info!(
        skills = skills.len(),
        agents = agents.len(),
        "parsed analysis response"
    );

    Ok(AnalysisResult { skills, agents })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_is_clipped_from_prose() {
        let text = "Here is the analysis:\n```json\n{\"skills\": []}\n```\nDone.";
        assert_eq!(extract_json_span(text), Some("{\"skills\": []}"));
    }

    #[test]
    fn span_is_greedy() {
        let text = "{\"a\": {\"b\": 1}} trailing }";
        assert_eq!(extract_json_span(text), Some("{\"a\": {\"b\": 1}} trailing }"));
    }

    #[test]
    fn no_span_without_braces() {
        assert_eq!(extract_json_span("no json here"), None);
        assert_eq!(extract_json_span("} backwards {"), None);
    }

    #[test]
    fn parse_full_response() {
        let text = r#"Analysis complete.
{
  "skills": [
    {"name": "error-handling", "description": "Typed errors", "triggers": ["error"], "category": "reliability"}
  ],
  "agents": [
    {
      "name": "root",
      "skills": ["error-handling"],
      "tools": ["cargo test"],
      "subAgents": [{"name": "storage", "triggers": ["db"]}, "docs"]
    }
  ]
}"#;
        let result = parse_analysis_response(text).unwrap();
        assert_eq!(result.skills.len(), 1);
        assert_eq!(result.skills[0].category, "reliability");
        assert_eq!(result.agents.len(), 2);
        assert_eq!(result.agents[0].tools[0].name, "cargo");
        assert_eq!(result.agents[1].name, "storage");
        assert_eq!(result.agents[1].parent_agent.as_deref(), Some("root"));
    }

    #[test]
    fn missing_arrays_yield_empty_result() {
        let result = parse_analysis_response(r#"{"summary": "nothing"}"#).unwrap();
        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = parse_analysis_response("{ not json }").unwrap_err();
        assert!(matches!(err, SkillsmithError::MalformedResponse(_)));

        let err = parse_analysis_response("plain text").unwrap_err();
        assert!(err.to_string().contains("no JSON object"));
    }
}
