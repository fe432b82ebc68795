//! Builder settings and activation-time settings providers.

use std::collections::HashMap;
use std::time::Duration;

use crate::backend::OutputSink;
use crate::util::config::Config;
use crate::util::context::ProjectPaths;

/// Key for extra definition file patterns (comma-separated).
pub const PROVIDER_COMPOSE_FILES: &str = "compose.files";

/// Key for the validation timeout in seconds.
pub const PROVIDER_VALIDATE_TIMEOUT: &str = "build.validate_timeout_secs";

/// Key/value lookups supplied when a builder is activated.
pub trait SettingsProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// A provider with no settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettings;

impl SettingsProvider for NoSettings {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

impl SettingsProvider for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl SettingsProvider for Config {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "project.name" => self.project.name.clone(),
            "compose.program" => Some(self.compose_program().to_string()),
            PROVIDER_COMPOSE_FILES if !self.compose.files.is_empty() => {
                Some(self.compose.files.join(","))
            }
            PROVIDER_VALIDATE_TIMEOUT => self.build.validate_timeout_secs.map(|s| s.to_string()),
            _ => None,
        }
    }
}

/// Everything a builder is constructed with.
#[derive(Debug, Clone)]
pub struct BuilderSettings {
    paths: ProjectPaths,
    config: Config,
    stdout: OutputSink,
    stderr: OutputSink,
}

impl BuilderSettings {
    pub fn new(paths: ProjectPaths, config: Config) -> Self {
        BuilderSettings {
            paths,
            config,
            stdout: OutputSink::Inherit,
            stderr: OutputSink::Inherit,
        }
    }

    /// Route compose output to the given sinks.
    pub fn with_output(mut self, stdout: OutputSink, stderr: OutputSink) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stdout(&self) -> &OutputSink {
        &self.stdout
    }

    pub fn stderr(&self) -> &OutputSink {
        &self.stderr
    }

    /// Validation timeout, letting the provider override the config.
    pub fn validate_timeout(&self, provider: &dyn SettingsProvider) -> Duration {
        provider
            .get(PROVIDER_VALIDATE_TIMEOUT)
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.validate_timeout())
    }
}
