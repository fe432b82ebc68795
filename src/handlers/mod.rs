//! Handlers built by the local builder.
//!
//! | implementation | handlers                          | operations                          |
//! |----------------|-----------------------------------|-------------------------------------|
//! | `settings`     | [`SettingHandler`]                | `setting.get/set/list`              |
//! | `config`       | [`ConfigHandler`]                 | `config.get/list`                   |
//! | `project`      | [`ProjectHandler`]                | `project.init`                      |
//! | `orchestrate`  | [`OrchestrateHandler`], [`MonitorHandler`] | `orchestrate.*`, `monitor.*` |
//! | `command`      | [`CommandHandler`]                | `command.list/exec`                 |

pub mod command;
pub mod config;
pub mod monitor;
pub mod orchestrate;
pub mod project;
pub mod setting;

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;

use crate::backend::{BackendError, ComposeContext};
use crate::core::operation::Operation;
use crate::core::property::Properties;
use crate::core::result::OpResult;

pub use command::{CommandDefinition, CommandHandler, CommandSet};
pub use config::ConfigHandler;
pub use monitor::MonitorHandler;
pub use orchestrate::OrchestrateHandler;
pub use project::ProjectHandler;
pub use setting::{SettingHandler, SettingsStore};

type ExecFn = dyn Fn(Properties) -> OpResult + Send + Sync;

/// An operation defined by a closure.
pub(crate) struct FnOperation {
    id: &'static str,
    description: &'static str,
    properties: Properties,
    exec: Box<ExecFn>,
}

impl FnOperation {
    pub(crate) fn new(
        id: &'static str,
        description: &'static str,
        properties: Properties,
        exec: impl Fn(Properties) -> OpResult + Send + Sync + 'static,
    ) -> Arc<dyn Operation> {
        Arc::new(FnOperation {
            id,
            description,
            properties,
            exec: Box::new(exec),
        })
    }
}

impl Operation for FnOperation {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn properties(&self) -> Properties {
        self.properties.clone()
    }

    fn exec(&self, props: Properties) -> OpResult {
        (self.exec)(props)
    }
}

/// Succeeds if the project root is a directory.
pub(crate) fn probe_root(root: &Path) -> OpResult {
    if root.is_dir() {
        OpResult::successful()
    } else {
        OpResult::failed(anyhow!("project root {} does not exist", root.display()))
    }
}

/// Succeeds if at least one definition file of `context` exists.
pub(crate) fn probe_definition_files(context: Arc<ComposeContext>) -> OpResult {
    OpResult::spawn_blocking(move |producer| {
        if context.existing_files().is_empty() {
            let mut searched: Vec<String> = context
                .files()
                .iter()
                .map(|f| f.display().to_string())
                .collect();
            if searched.is_empty() {
                searched.push(context.paths().compose_file().display().to_string());
            }
            producer.fail(BackendError::NoDefinitionFiles { searched });
        }
    })
}
