//! Registry configuration.
//!
//! Reads the `[registry]` section from `config/default.toml`, then applies
//! environment overrides and finally command-line overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use skillsmith_core::{DEFAULT_REGISTRY_PATH, DEFAULT_SEARCH_LIMIT};

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Env var overriding the registry file path.
pub const ENV_REGISTRY: &str = "SKILLSMITH_REGISTRY";

/// Env var overriding the repository root.
pub const ENV_ROOT: &str = "SKILLSMITH_ROOT";

/// Settings loaded from the `[registry]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Repository root the default registry path is resolved against.
    pub root: PathBuf,
    /// Explicit registry file path; wins over `root` when set.
    pub path: Option<PathBuf>,
    /// Number of search results when `--limit` is not given.
    pub default_limit: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            path: None,
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl RegistryConfig {
    /// The registry file this configuration points at.
    pub fn registry_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| self.root.join(DEFAULT_REGISTRY_PATH))
    }

    /// Apply `SKILLSMITH_ROOT` / `SKILLSMITH_REGISTRY` from the given lookup.
    pub fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = var(ENV_ROOT).filter(|v| !v.is_empty()) {
            self.root = PathBuf::from(root);
        }
        if let Some(path) = var(ENV_REGISTRY).filter(|v| !v.is_empty()) {
            self.path = Some(PathBuf::from(path));
        }
        self
    }

    /// Apply `--root` / `--registry`.  A `--root` on its own also clears any
    /// configured path so the registry follows the requested root.
    pub fn apply_cli(mut self, root: Option<PathBuf>, registry: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.root = root;
            self.path = None;
        }
        if let Some(path) = registry {
            self.path = Some(path);
        }
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    registry: RegistryConfig,
}

/// Parse registry configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RegistryConfig, toml::de::Error> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(RegistryConfig {
        default_limit: file.registry.default_limit.max(1),
        ..file.registry
    })
}

/// Load registry configuration from `path`.
///
/// Falls back to defaults if the file is missing; a file that exists but
/// does not parse is logged and ignored.
pub fn load_config(path: &Path) -> RegistryConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return RegistryConfig::default(),
    };

    match parse_config(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            RegistryConfig::default()
        }
    }
}

/// Resolve the effective configuration: file, then env, then flags.
pub fn resolve(root: Option<PathBuf>, registry: Option<PathBuf>) -> RegistryConfig {
    load_config(Path::new(DEFAULT_CONFIG_PATH))
        .apply_env(|key| std::env::var(key).ok())
        .apply_cli(root, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_section_missing() {
        let config = parse_config("[other]\nkey = 1\n").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(
            config.registry_path(),
            PathBuf::from(".").join(".github/registry.jsonl")
        );
    }

    #[test]
    fn reads_registry_section() {
        let config = parse_config(
            "[registry]\nroot = \"/srv/repo\"\ndefault_limit = 25\n",
        )
        .unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/repo"));
        assert_eq!(config.default_limit, 25);
        assert_eq!(
            config.registry_path(),
            PathBuf::from("/srv/repo/.github/registry.jsonl")
        );
    }

    #[test]
    fn zero_limit_is_clamped() {
        let config = parse_config("[registry]\ndefault_limit = 0\n").unwrap();
        assert_eq!(config.default_limit, 1);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(parse_config("[registry\n").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(&tmp.path().join("nope.toml"));
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn env_overrides_file() {
        let config = RegistryConfig::default().apply_env(|key| match key {
            ENV_REGISTRY => Some("/tmp/reg.jsonl".to_owned()),
            ENV_ROOT => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.registry_path(), PathBuf::from("/tmp/reg.jsonl"));
    }

    #[test]
    fn cli_root_clears_configured_path() {
        let config = RegistryConfig {
            path: Some(PathBuf::from("/tmp/reg.jsonl")),
            ..RegistryConfig::default()
        }
        .apply_cli(Some(PathBuf::from("/repo")), None);
        assert_eq!(
            config.registry_path(),
            PathBuf::from("/repo/.github/registry.jsonl")
        );

        let config = config.apply_cli(None, Some(PathBuf::from("/x.jsonl")));
        assert_eq!(config.registry_path(), PathBuf::from("/x.jsonl"));
    }
}
