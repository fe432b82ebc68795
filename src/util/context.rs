//! Global context for Rigging operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::{self, Config};

/// Name of the project-local rigging directory.
pub const RIGGING_DIR: &str = ".rigging";

/// Name of the root definition file.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Project directories for Rigging
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "rigging", "rigging"));

/// The file locations of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProjectPaths { root: root.into() }
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project-local `.rigging` directory.
    pub fn rigging_dir(&self) -> PathBuf {
        self.root.join(RIGGING_DIR)
    }

    /// The root definition file.
    pub fn compose_file(&self) -> PathBuf {
        self.root.join(COMPOSE_FILE)
    }

    /// Project settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.rigging_dir().join("settings.toml")
    }

    /// Path of the named config document.
    pub fn config_document(&self, key: &str) -> PathBuf {
        self.rigging_dir().join(format!("{}.toml", key))
    }

    /// Project config file.
    pub fn config_file(&self) -> PathBuf {
        config::project_config_path(&self.root)
    }

    /// Directory name of the root, used as a default project name.
    pub fn dir_name(&self) -> Option<String> {
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
    }
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Rigging data (~/.rigging/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = config::global_config_dir()
            .or_else(|| PROJECT_DIRS.as_ref().map(|d| d.config_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(RIGGING_DIR));

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Find the project root, searching upward from cwd for a `.rigging`
    /// directory or a `docker-compose.yml`.
    ///
    /// Falls back to the working directory itself.
    pub fn find_project_root(&self) -> PathBuf {
        let mut current = self.cwd.clone();
        loop {
            let rigging_dir = current.join(RIGGING_DIR);
            // The global config directory is not a project marker.
            if (rigging_dir.is_dir() && rigging_dir != self.home)
                || current.join(COMPOSE_FILE).is_file()
            {
                return current;
            }
            if !current.pop() {
                return self.cwd.clone();
            }
        }
    }

    /// Paths of the project containing the working directory.
    pub fn project(&self) -> ProjectPaths {
        ProjectPaths::new(self.find_project_root())
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self, project: &ProjectPaths) -> Config {
        config::load_config(&self.config_path(), &project.config_file())
    }
}
