//! Error types for the skillsmith core.

use std::path::PathBuf;

/// Errors surfaced by the fail-loud paths (registry build, response
/// extraction). Read paths never return these; they degrade to empty.
#[derive(Debug, thiserror::Error)]
pub enum SkillsmithError {
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("failed to write registry at `{path}`: {source}")]
    RegistryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SkillsmithError>;
