//! Configuration file support for Rigging.
//!
//! Rigging reads two configuration files:
//! - Global: `~/.rigging/config.toml` - User-wide defaults
//! - Project: `.rigging/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default compose program.
pub const DEFAULT_COMPOSE_PROGRAM: &str = "docker";

/// Default validation timeout in seconds.
pub const DEFAULT_VALIDATE_TIMEOUT_SECS: u64 = 30;

/// Rigging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project settings
    pub project: ProjectConfig,

    /// Compose backend settings
    pub compose: ComposeConfig,

    /// Builder settings
    pub build: BuildConfig,

    /// API assembly settings
    pub api: ApiConfig,
}

/// Project-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name used when no `Project` setting is available
    pub name: Option<String>,
}

/// Compose backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Compose program (defaults to `docker`)
    pub program: Option<String>,

    /// Arguments placed before any compose arguments (defaults to `["compose"]`)
    pub args: Option<Vec<String>>,

    /// Extra definition file patterns, relative to the project root
    pub files: Vec<String>,

    /// Extra environment for compose processes
    pub env: BTreeMap<String, String>,
}

/// Builder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// How long a handler validation may take, in seconds
    pub validate_timeout_secs: Option<u64>,
}

/// API assembly configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Implementations activated by the CLI, in order
    pub implementations: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.project.name.is_some() {
            self.project.name = other.project.name;
        }

        if other.compose.program.is_some() {
            self.compose.program = other.compose.program;
        }
        if other.compose.args.is_some() {
            self.compose.args = other.compose.args;
        }
        if !other.compose.files.is_empty() {
            self.compose.files = other.compose.files;
        }
        // Environment merges per variable
        self.compose.env.extend(other.compose.env);

        if other.build.validate_timeout_secs.is_some() {
            self.build.validate_timeout_secs = other.build.validate_timeout_secs;
        }

        if other.api.implementations.is_some() {
            self.api.implementations = other.api.implementations;
        }
    }

    /// The compose program to run.
    pub fn compose_program(&self) -> &str {
        self.compose
            .program
            .as_deref()
            .unwrap_or(DEFAULT_COMPOSE_PROGRAM)
    }

    /// Arguments that select the compose subcommand of the program.
    pub fn compose_args(&self) -> Vec<String> {
        self.compose
            .args
            .clone()
            .unwrap_or_else(|| vec!["compose".to_string()])
    }

    /// Validation timeout.
    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(
            self.build
                .validate_timeout_secs
                .unwrap_or(DEFAULT_VALIDATE_TIMEOUT_SECS),
        )
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.rigging/config.toml)
/// 2. Global config (~/.rigging/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global rigging config directory (~/.rigging).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rigging"))
}

/// Get the global config path (~/.rigging/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.rigging/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".rigging").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.compose_program(), "docker");
        assert_eq!(config.compose_args(), vec!["compose"]);
        assert_eq!(config.validate_timeout(), Duration::from_secs(30));
        assert!(config.api.implementations.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[project]
name = "acme"

[compose]
program = "podman-compose"
args = []
files = ["docker-compose.override.yml"]

[compose.env]
COMPOSE_HTTP_TIMEOUT = "120"

[build]
validate_timeout_secs = 5

[api]
implementations = ["project", "orchestrate"]
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.project.name, Some("acme".to_string()));
        assert_eq!(config.compose_program(), "podman-compose");
        assert!(config.compose_args().is_empty());
        assert_eq!(config.compose.files, vec!["docker-compose.override.yml"]);
        assert_eq!(
            config.compose.env.get("COMPOSE_HTTP_TIMEOUT"),
            Some(&"120".to_string())
        );
        assert_eq!(config.validate_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.api.implementations,
            Some(vec!["project".to_string(), "orchestrate".to_string()])
        );
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.project.name = Some("global".to_string());
        base.compose.env.insert("A".to_string(), "1".to_string());
        base.build.validate_timeout_secs = Some(10);

        let mut override_cfg = Config::default();
        override_cfg.project.name = Some("local".to_string());
        override_cfg.compose.env.insert("B".to_string(), "2".to_string());

        base.merge(override_cfg);

        assert_eq!(base.project.name, Some("local".to_string()));
        assert_eq!(base.compose.env.len(), 2);
        assert_eq!(base.build.validate_timeout_secs, Some(10)); // Not overridden
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[compose]\nprogram = \"podman\"\n\n[project]\nname = \"global\"\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[project]\nname = \"local\"\n").unwrap();

        let config = load_config(&global_path, &project_path);
        assert_eq!(config.compose_program(), "podman");
        assert_eq!(config.project.name, Some("local".to_string()));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build\nvalidate_timeout_secs = ").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.build.validate_timeout_secs.is_none());
    }
}
