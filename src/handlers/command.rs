//! Project-defined commands, run as one-off service containers.
//!
//! Commands come from the `commands` config document:
//!
//! ```toml
//! [commands.shell]
//! description = "Open a shell in the app container"
//! service = "app"
//! run = ["sh"]
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::FnOperation;
use crate::backend::{ComposeAction, ComposeContext, ComposeOperation};
use crate::core::handler::Handler;
use crate::core::operation::{self, Operation, Operations};
use crate::core::property::{Properties, Property, PropertyKind};
use crate::core::result::OpResult;
use crate::wrapper::command::{COMMAND_EXEC, COMMAND_LIST};
use crate::wrapper::{ConfigWrapper, KeyNotFound, SimpleCommandWrapper, WrapperError};

pub const COMMAND_HANDLER_ID: &str = "local.command";

/// Config document holding the command definitions.
pub const COMMANDS_KEY: &str = "commands";

/// One runnable command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    #[serde(default)]
    pub description: String,

    /// Service whose container runs the command
    pub service: String,

    /// Command and arguments; empty runs the service's default command
    #[serde(default)]
    pub run: Vec<String>,
}

/// The commands defined for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    #[serde(default)]
    commands: BTreeMap<String, CommandDefinition>,
}

impl CommandSet {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse command definitions")
    }

    pub fn get(&self, key: &str) -> Option<&CommandDefinition> {
        self.commands.get(key)
    }

    /// Command names, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Runs commands from the `commands` config.
///
/// Validation loads the definitions through the config wrapper; a project
/// without a commands document gets an empty set.
pub struct CommandHandler {
    context: Arc<ComposeContext>,
    config: Arc<dyn ConfigWrapper>,
    commands: Arc<OnceLock<CommandSet>>,
}

impl CommandHandler {
    pub fn new(context: Arc<ComposeContext>, config: Arc<dyn ConfigWrapper>) -> Self {
        CommandHandler {
            context,
            config,
            commands: Arc::new(OnceLock::new()),
        }
    }

    /// Commands loaded during validation; empty before.
    pub fn commands(&self) -> CommandSet {
        self.commands.get().cloned().unwrap_or_default()
    }

    /// The wrapper this handler publishes.
    pub fn command_wrapper(&self) -> SimpleCommandWrapper {
        SimpleCommandWrapper::new(self.operations())
    }
}

async fn load_commands(config: &dyn ConfigWrapper) -> Result<CommandSet> {
    match config.get(COMMANDS_KEY).await {
        Ok(text) => CommandSet::parse(&text),
        Err(WrapperError::NotFound(_)) => {
            tracing::debug!("no command definitions");
            Ok(CommandSet::default())
        }
        Err(WrapperError::Unavailable(op)) => {
            tracing::error!(operation = %op, "Config unavailable, no commands loaded");
            Ok(CommandSet::default())
        }
        Err(e) => Err(e).context("failed to load command definitions"),
    }
}

/// Build the compose `run` invocation for a command.
fn run_command(
    context: &Arc<ComposeContext>,
    commands: &CommandSet,
    props: &Properties,
) -> Result<OpResult> {
    let key = props.require("key")?.as_str()?;
    let definition = commands
        .get(key)
        .ok_or_else(|| KeyNotFound(key.to_string()))?;

    let project = props.require("project")?.as_str()?;
    let context = if project == context.project_name() {
        Arc::clone(context)
    } else {
        Arc::new(context.with_project_name(project))
    };

    let mut command = definition.run.clone();
    command.extend_from_slice(props.require("args")?.as_strings()?);

    let run = ComposeOperation::new(COMMAND_EXEC, ComposeAction::Run, context);
    let mut run_props = run.properties();
    run_props.set("service", definition.service.as_str())?;
    run_props.set("command", command)?;
    Ok(operation::execute(&run, run_props))
}

impl Handler for CommandHandler {
    fn id(&self) -> &str {
        COMMAND_HANDLER_ID
    }

    fn validate(&self) -> OpResult {
        let config = Arc::clone(&self.config);
        let commands = Arc::clone(&self.commands);
        OpResult::spawn(async move {
            let loaded = load_commands(config.as_ref()).await?;
            tracing::debug!(commands = loaded.len(), "command definitions loaded");
            let _ = commands.set(loaded);
            Ok(())
        })
    }

    fn operations(&self) -> Operations {
        let commands = self.commands();

        let keys = commands.keys();
        let list = FnOperation::new(
            COMMAND_LIST,
            "List project commands",
            Properties::new(),
            move |_| {
                let (mut producer, result) = OpResult::pending();
                producer.set_output("keys", keys.clone());
                producer.finish();
                result
            },
        );

        let context = Arc::clone(&self.context);
        let exec_props = Properties::new()
            .with(
                Property::new("key", PropertyKind::String)
                    .with_description("Command name")
                    .required(),
            )
            .with(
                Property::new("args", PropertyKind::Strings)
                    .with_description("Extra arguments")
                    .with_default(Vec::<String>::new()),
            )
            .with(
                Property::new("project", PropertyKind::String)
                    .with_description("Compose project to run in")
                    .with_default(self.context.project_name()),
            );
        let exec = FnOperation::new(
            COMMAND_EXEC,
            "Run a project command",
            exec_props,
            move |props| match run_command(&context, &commands, &props) {
                Ok(result) => result,
                Err(e) => OpResult::failed(e),
            },
        );

        let mut ops = Operations::new();
        let _ = ops.add(list);
        let _ = ops.add(exec);
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support;
    use crate::wrapper::{CommandWrapper, NoopConfigWrapper, SimpleConfigWrapper};
    use async_trait::async_trait;
    use tempfile::TempDir;

    const COMMANDS: &str = r#"
[commands.shell]
description = "Open a shell"
service = "app"
run = ["sh"]

[commands.migrate]
service = "app"
run = ["manage", "migrate"]
"#;

    struct StaticConfig(&'static str);

    #[async_trait]
    impl ConfigWrapper for StaticConfig {
        async fn get(&self, key: &str) -> Result<String, WrapperError> {
            if key == COMMANDS_KEY {
                Ok(self.0.to_string())
            } else {
                Err(WrapperError::NotFound(key.to_string()))
            }
        }

        async fn list(&self) -> Result<Vec<String>, WrapperError> {
            Ok(vec![COMMANDS_KEY.to_string()])
        }
    }

    #[test]
    fn test_parse_commands() {
        let set = CommandSet::parse(COMMANDS).unwrap();
        assert_eq!(set.keys(), vec!["migrate", "shell"]);
        assert_eq!(set.get("shell").unwrap().service, "app");
        assert_eq!(set.get("migrate").unwrap().description, "");

        assert!(CommandSet::parse("").unwrap().is_empty());
        assert!(CommandSet::parse("[commands.broken]\nrun = 3\n").is_err());
    }

    #[tokio::test]
    async fn test_missing_commands_document_is_empty() {
        let tmp = TempDir::new().unwrap();
        let handler = CommandHandler::new(
            test_support::context(tmp.path(), "docker"),
            Arc::new(NoopConfigWrapper),
        );
        let result = handler.validate();
        result.finished().await;
        assert!(result.success());
        assert!(handler.commands().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_config_is_empty() {
        let tmp = TempDir::new().unwrap();
        let handler = CommandHandler::new(
            test_support::context(tmp.path(), "docker"),
            Arc::new(SimpleConfigWrapper::new(Operations::new())),
        );
        let result = handler.validate();
        result.finished().await;
        assert!(result.success());
    }

    #[tokio::test]
    async fn test_invalid_commands_fail_validation() {
        let tmp = TempDir::new().unwrap();
        let handler = CommandHandler::new(
            test_support::context(tmp.path(), "docker"),
            Arc::new(StaticConfig("[commands.shell]\nrun = [\"sh\"]\n")),
        );
        let result = handler.validate();
        result.finished().await;
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_runs_service_command() {
        let tmp = TempDir::new().unwrap();
        let context = test_support::context(tmp.path(), "echo");
        let handler = CommandHandler::new(Arc::clone(&context), Arc::new(StaticConfig(COMMANDS)));
        handler.validate().finished().await;

        let wrapper = handler.command_wrapper();
        assert_eq!(wrapper.list().await.unwrap(), vec!["migrate", "shell"]);
        wrapper
            .exec("migrate", &["--plan".to_string()])
            .await
            .unwrap();

        let out = context.stdout().contents().unwrap();
        assert!(out.contains("-p acme"));
        assert!(out.trim_end().ends_with("run --rm app manage migrate --plan"));

        assert!(matches!(
            wrapper.exec("deploy", &[]).await,
            Err(WrapperError::NotFound(key)) if key == "deploy"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_in_other_project() {
        let tmp = TempDir::new().unwrap();
        let context = test_support::context(tmp.path(), "echo");
        let handler = CommandHandler::new(Arc::clone(&context), Arc::new(StaticConfig(COMMANDS)));
        handler.validate().finished().await;

        let result = handler.operations().run(COMMAND_EXEC, |props| {
            props.set("key", "shell")?;
            props.set("project", "staging")
        });
        result.finished().await;
        assert!(result.success(), "{:?}", result.error_messages());
        assert!(context.stdout().contents().unwrap().contains("-p staging"));
    }
}
