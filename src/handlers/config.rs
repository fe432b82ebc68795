//! Named config documents stored as `.rigging/<key>.toml`.

use std::sync::Arc;

use anyhow::{bail, Result};

use super::{probe_root, FnOperation};
use crate::builder::BuilderSettings;
use crate::core::handler::Handler;
use crate::core::operation::Operations;
use crate::core::property::{Properties, Property, PropertyKind};
use crate::core::result::OpResult;
use crate::util::context::ProjectPaths;
use crate::util::fs::read_to_string;
use crate::wrapper::config::{CONFIG_GET, CONFIG_LIST};
use crate::wrapper::KeyNotFound;

pub const CONFIG_HANDLER_ID: &str = "local.config";

/// Documents in the rigging directory that are not config documents.
const RESERVED: &[&str] = &["settings", "config"];

fn check_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\'])
        || RESERVED.contains(&key)
    {
        bail!("invalid config key `{}`", key);
    }
    Ok(())
}

/// Read the raw text of config document `key`.
fn read_document(paths: &ProjectPaths, key: &str) -> Result<Option<String>> {
    check_key(key)?;
    let path = paths.config_document(key);
    if !path.is_file() {
        return Ok(None);
    }
    read_to_string(&path).map(Some)
}

/// Keys of every config document, sorted.
fn document_keys(paths: &ProjectPaths) -> Result<Vec<String>> {
    let dir = paths.rigging_dir();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut keys = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !RESERVED.contains(&stem) {
                    keys.push(stem.to_string());
                }
            }
        }
    }
    keys.sort();
    Ok(keys)
}

/// Serves `config.*` from the project's rigging directory.
pub struct ConfigHandler {
    settings: Arc<BuilderSettings>,
}

impl ConfigHandler {
    pub fn new(settings: Arc<BuilderSettings>) -> Self {
        ConfigHandler { settings }
    }
}

impl Handler for ConfigHandler {
    fn id(&self) -> &str {
        CONFIG_HANDLER_ID
    }

    fn validate(&self) -> OpResult {
        probe_root(self.settings.paths().root())
    }

    fn operations(&self) -> Operations {
        let mut ops = Operations::new();

        let paths = self.settings.paths().clone();
        let get = FnOperation::new(
            CONFIG_GET,
            "Read a config document",
            Properties::new().with(
                Property::new("key", PropertyKind::String)
                    .with_description("Document name")
                    .required(),
            ),
            move |props| {
                let paths = paths.clone();
                OpResult::spawn_blocking(move |producer| {
                    let key = match props.require("key").and_then(|p| p.as_str()) {
                        Ok(key) => key.to_string(),
                        Err(e) => return producer.fail(e),
                    };
                    match read_document(&paths, &key) {
                        Ok(Some(text)) => producer.set_output("value", text),
                        Ok(None) => producer.fail(KeyNotFound(key)),
                        Err(e) => producer.fail(e),
                    }
                })
            },
        );

        let paths = self.settings.paths().clone();
        let list = FnOperation::new(
            CONFIG_LIST,
            "List config documents",
            Properties::new(),
            move |_| {
                let paths = paths.clone();
                OpResult::spawn_blocking(move |producer| match document_keys(&paths) {
                    Ok(keys) => producer.set_output("keys", keys),
                    Err(e) => producer.fail(e),
                })
            },
        );

        let _ = ops.add(get);
        let _ = ops.add(list);
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::Config;
    use crate::wrapper::{ConfigWrapper, SimpleConfigWrapper, WrapperError};
    use tempfile::TempDir;

    fn handler(tmp: &TempDir) -> ConfigHandler {
        let settings = BuilderSettings::new(ProjectPaths::new(tmp.path()), Config::default());
        ConfigHandler::new(Arc::new(settings))
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("commands").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../secrets").is_err());
        assert!(check_key("settings").is_err());
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".rigging");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("commands.toml"), "[commands]\n").unwrap();
        std::fs::write(dir.join("settings.toml"), "Project = \"acme\"\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let wrapper = SimpleConfigWrapper::new(handler(&tmp).operations());
        assert_eq!(wrapper.get("commands").await.unwrap(), "[commands]\n");
        assert_eq!(wrapper.list().await.unwrap(), vec!["commands"]);
        assert!(matches!(
            wrapper.get("services").await,
            Err(WrapperError::NotFound(_))
        ));
        assert!(matches!(
            wrapper.get("settings").await,
            Err(WrapperError::Failed { .. })
        ));
    }
}
