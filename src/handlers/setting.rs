//! Project settings stored in `.rigging/settings.toml`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use toml_edit::DocumentMut;

use super::{probe_root, FnOperation};
use crate::builder::BuilderSettings;
use crate::core::handler::Handler;
use crate::core::operation::Operations;
use crate::core::property::{Properties, Property, PropertyKind};
use crate::core::result::OpResult;
use crate::util::fs::{ensure_dir, write_atomic};
use crate::wrapper::setting::{SETTING_GET, SETTING_LIST, SETTING_SET};
use crate::wrapper::KeyNotFound;

pub const SETTING_HANDLER_ID: &str = "local.setting";

/// A flat key/value table in a TOML file.
///
/// Non-string values are rendered with their TOML representation.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn table(&self) -> Result<toml::Table> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        contents
            .parse::<toml::Table>()
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.table()?.get(key).map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn document(&self) -> Result<DocumentMut> {
        let contents = if self.path.exists() {
            std::fs::read_to_string(&self.path)
                .with_context(|| format!("failed to read {}", self.path.display()))?
        } else {
            String::new()
        };
        contents
            .parse::<DocumentMut>()
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    /// Set `key`, keeping the rest of the file as written.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut doc = self.document()?;
        doc[key] = toml_edit::value(value);

        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        write_atomic(&self.path, &doc.to_string())
    }

    /// Keys in file order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let doc = self.document()?;
        Ok(doc.as_table().iter().map(|(key, _)| key.to_string()).collect())
    }
}

/// Serves `setting.*` from the project settings file.
pub struct SettingHandler {
    settings: Arc<BuilderSettings>,
    store: SettingsStore,
}

impl SettingHandler {
    pub fn new(settings: Arc<BuilderSettings>) -> Self {
        let store = SettingsStore::new(settings.paths().settings_file());
        SettingHandler { settings, store }
    }
}

fn key_property() -> Property {
    Property::new("key", PropertyKind::String)
        .with_description("Setting name")
        .required()
}

impl Handler for SettingHandler {
    fn id(&self) -> &str {
        SETTING_HANDLER_ID
    }

    fn validate(&self) -> OpResult {
        probe_root(self.settings.paths().root())
    }

    fn operations(&self) -> Operations {
        let mut ops = Operations::new();

        let store = self.store.clone();
        let get = FnOperation::new(
            SETTING_GET,
            "Read a project setting",
            Properties::new().with(key_property()),
            move |props| {
                let store = store.clone();
                OpResult::spawn_blocking(move |producer| {
                    let key = match props.require("key").and_then(|p| p.as_str()) {
                        Ok(key) => key.to_string(),
                        Err(e) => return producer.fail(e),
                    };
                    match store.get(&key) {
                        Ok(Some(value)) => producer.set_output("value", value),
                        Ok(None) => producer.fail(KeyNotFound(key)),
                        Err(e) => producer.fail(e),
                    }
                })
            },
        );

        let store = self.store.clone();
        let set = FnOperation::new(
            SETTING_SET,
            "Write a project setting",
            Properties::new().with(key_property()).with(
                Property::new("value", PropertyKind::String)
                    .with_description("New value")
                    .required(),
            ),
            move |props| {
                let store = store.clone();
                OpResult::spawn_blocking(move |producer| {
                    let assignment = props
                        .require("key")
                        .and_then(|p| p.as_str())
                        .and_then(|key| Ok((key, props.require("value")?.as_str()?)));
                    match assignment {
                        Ok((key, value)) => {
                            if let Err(e) = store.set(key, value) {
                                producer.fail(e);
                            }
                        }
                        Err(e) => producer.fail(e),
                    }
                })
            },
        );

        let store = self.store.clone();
        let list = FnOperation::new(
            SETTING_LIST,
            "List project setting names",
            Properties::new(),
            move |_| {
                let store = store.clone();
                OpResult::spawn_blocking(move |producer| match store.keys() {
                    Ok(keys) => producer.set_output("keys", keys),
                    Err(e) => producer.fail(e),
                })
            },
        );

        for op in [get, set, list] {
            // Ids are distinct constants.
            let _ = ops.add(op);
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::Config;
    use crate::util::context::ProjectPaths;
    use crate::wrapper::{SettingWrapper, SimpleSettingWrapper, WrapperError};
    use tempfile::TempDir;

    #[test]
    fn test_store_preserves_formatting() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "# project settings\nProject = \"acme\"\nReplicas = 3\n").unwrap();

        let store = SettingsStore::new(&path);
        assert_eq!(store.get("Project").unwrap(), Some("acme".to_string()));
        assert_eq!(store.get("Replicas").unwrap(), Some("3".to_string()));
        assert_eq!(store.get("Missing").unwrap(), None);

        store.set("Project", "other").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# project settings\n"));
        assert!(contents.contains("Project = \"other\""));
        assert_eq!(store.keys().unwrap(), vec!["Project", "Replicas"]);
    }

    #[test]
    fn test_store_keys_keep_file_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "Zone = \"eu\"\nProject = \"acme\"\n").unwrap();

        let store = SettingsStore::new(&path);
        store.set("Debug", "true").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["Zone", "Project", "Debug"]);
    }

    #[test]
    fn test_store_creates_file() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path().join(".rigging").join("settings.toml"));
        assert!(store.keys().unwrap().is_empty());

        store.set("Project", "acme").unwrap();
        assert_eq!(store.get("Project").unwrap(), Some("acme".to_string()));
    }

    #[tokio::test]
    async fn test_operations_through_wrapper() {
        let tmp = TempDir::new().unwrap();
        let settings = BuilderSettings::new(ProjectPaths::new(tmp.path()), Config::default());
        let handler = SettingHandler::new(Arc::new(settings));
        assert!(handler.validate().success());

        let wrapper = SimpleSettingWrapper::new(handler.operations());
        assert!(matches!(
            wrapper.get("Project").await,
            Err(WrapperError::NotFound(key)) if key == "Project"
        ));

        wrapper.set("Project", "acme").await.unwrap();
        assert_eq!(wrapper.get("Project").await.unwrap(), "acme");
        assert_eq!(wrapper.list().await.unwrap(), vec!["Project"]);
    }
}
