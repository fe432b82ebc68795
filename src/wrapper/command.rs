//! Command wrapper: run project-defined commands.

use async_trait::async_trait;

use super::{strings_output, OperationSource, WrapperError};

pub const COMMAND_LIST: &str = "command.list";
pub const COMMAND_EXEC: &str = "command.exec";

#[async_trait]
pub trait CommandWrapper: Send + Sync {
    /// Keys of the defined commands.
    async fn list(&self) -> Result<Vec<String>, WrapperError>;

    /// Run command `key` with extra arguments.
    async fn exec(&self, key: &str, args: &[String]) -> Result<(), WrapperError>;
}

/// Command wrapper over the `command.*` operations.
#[derive(Clone)]
pub struct SimpleCommandWrapper {
    source: OperationSource,
}

impl SimpleCommandWrapper {
    pub fn new(source: impl Into<OperationSource>) -> Self {
        SimpleCommandWrapper {
            source: source.into(),
        }
    }
}

#[async_trait]
impl CommandWrapper for SimpleCommandWrapper {
    async fn list(&self) -> Result<Vec<String>, WrapperError> {
        let result = self.source.invoke(COMMAND_LIST, |_| Ok(())).await?;
        strings_output(&result, COMMAND_LIST, "keys")
    }

    async fn exec(&self, key: &str, args: &[String]) -> Result<(), WrapperError> {
        self.source
            .invoke(COMMAND_EXEC, |props| {
                props.set("key", key)?;
                props.set("args", args.to_vec())
            })
            .await?;
        Ok(())
    }
}
