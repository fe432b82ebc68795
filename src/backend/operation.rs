//! Compose operations.

use std::sync::Arc;

use crate::backend::ComposeContext;
use crate::core::operation::Operation;
use crate::core::property::{Properties, Property, PropertyError, PropertyKind};
use crate::core::result::OpResult;

/// A compose subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeAction {
    Up,
    Down,
    Start,
    Stop,
    Ps,
    Logs,
    Run,
}

impl ComposeAction {
    pub fn description(self) -> &'static str {
        match self {
            ComposeAction::Up => "Create and start the project's containers",
            ComposeAction::Down => "Stop and remove the project's containers",
            ComposeAction::Start => "Start existing containers",
            ComposeAction::Stop => "Stop running containers",
            ComposeAction::Ps => "List the project's containers",
            ComposeAction::Logs => "Show container output",
            ComposeAction::Run => "Run a one-off command in a service container",
        }
    }

    fn properties(self) -> Properties {
        let services = || {
            Property::new("services", PropertyKind::Strings)
                .with_description("Limit to these services")
                .with_default(Vec::<String>::new())
        };

        match self {
            ComposeAction::Up => Properties::new().with(
                Property::new("detach", PropertyKind::Bool)
                    .with_description("Run containers in the background")
                    .with_default(true),
            ),
            ComposeAction::Down => Properties::new().with(
                Property::new("volumes", PropertyKind::Bool)
                    .with_description("Also remove named volumes")
                    .with_default(false),
            ),
            ComposeAction::Start | ComposeAction::Stop | ComposeAction::Ps => {
                Properties::new().with(services())
            }
            ComposeAction::Logs => Properties::new()
                .with(
                    Property::new("follow", PropertyKind::Bool)
                        .with_description("Keep streaming output")
                        .with_default(false),
                )
                .with(services()),
            ComposeAction::Run => Properties::new()
                .with(
                    Property::new("service", PropertyKind::String)
                        .with_description("Service to run in")
                        .required(),
                )
                .with(
                    Property::new("command", PropertyKind::Strings)
                        .with_description("Command and arguments")
                        .with_default(Vec::<String>::new()),
                ),
        }
    }

    /// Compose arguments for this action.
    fn args(self, props: &Properties) -> Result<Vec<String>, PropertyError> {
        let flag = |name: &str| props.require(name).and_then(|p| p.as_bool());
        let list = |name: &str| {
            props
                .require(name)
                .and_then(|p| p.as_strings())
                .map(<[String]>::to_vec)
        };

        let mut args = Vec::new();
        match self {
            ComposeAction::Up => {
                args.push("up".to_string());
                if flag("detach")? {
                    args.push("-d".to_string());
                }
            }
            ComposeAction::Down => {
                args.push("down".to_string());
                if flag("volumes")? {
                    args.push("-v".to_string());
                }
            }
            ComposeAction::Start => {
                args.push("start".to_string());
                args.extend(list("services")?);
            }
            ComposeAction::Stop => {
                args.push("stop".to_string());
                args.extend(list("services")?);
            }
            ComposeAction::Ps => {
                args.push("ps".to_string());
                args.extend(list("services")?);
            }
            ComposeAction::Logs => {
                args.push("logs".to_string());
                if flag("follow")? {
                    args.push("-f".to_string());
                }
                args.extend(list("services")?);
            }
            ComposeAction::Run => {
                args.push("run".to_string());
                args.push("--rm".to_string());
                args.push(props.require("service")?.as_str()?.to_string());
                args.extend(list("command")?);
            }
        }
        Ok(args)
    }
}

/// An operation that runs one compose action against the shared context.
pub struct ComposeOperation {
    id: String,
    action: ComposeAction,
    context: Arc<ComposeContext>,
}

impl ComposeOperation {
    pub fn new(id: impl Into<String>, action: ComposeAction, context: Arc<ComposeContext>) -> Self {
        ComposeOperation {
            id: id.into(),
            action,
            context,
        }
    }
}

impl Operation for ComposeOperation {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        self.action.description()
    }

    fn properties(&self) -> Properties {
        self.action.properties()
    }

    fn exec(&self, props: Properties) -> OpResult {
        let args = match self.action.args(&props) {
            Ok(args) => args,
            Err(e) => return OpResult::failed(e),
        };

        let context = Arc::clone(&self.context);
        OpResult::spawn_blocking(move |producer| {
            let process = context.process(&args);
            if let Err(e) = context.run(&process) {
                producer.fail(e);
            }
        })
    }
}
