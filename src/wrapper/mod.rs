//! Capability wrappers.
//!
//! A wrapper is a narrow, typed facade over an operation set. It hides the
//! operation ids and property names behind semantic methods, so that one
//! handler can depend on another's capability without knowing how it is
//! implemented.

pub mod command;
pub mod config;
pub mod orchestrate;
pub mod setting;

use thiserror::Error;

use crate::api::OperationRegistry;
use crate::core::operation::{self, Operations};
use crate::core::property::{Properties, PropertyError, PropertyValue};
use crate::core::result::OpResult;

pub use command::{CommandWrapper, SimpleCommandWrapper};
pub use config::{ConfigWrapper, NoopConfigWrapper, SimpleConfigWrapper};
pub use orchestrate::{OrchestrateWrapper, SimpleOrchestrateWrapper};
pub use setting::{NoopSettingWrapper, SettingWrapper, SimpleSettingWrapper};

/// Errors surfaced by wrapper calls.
#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("operation `{0}` is not available")]
    Unavailable(String),

    #[error("`{operation}` failed: {}", .messages.join("; "))]
    Failed {
        operation: String,
        messages: Vec<String>,
    },

    #[error("`{0}` not found")]
    NotFound(String),

    #[error("`{operation}` did not produce `{output}`")]
    MissingOutput { operation: String, output: String },

    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// Error an operation reports when the key it was asked for does not exist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("`{0}` not found")]
pub struct KeyNotFound(pub String);

/// Where a wrapper finds its operations.
#[derive(Clone)]
pub enum OperationSource {
    /// A fixed set captured when the wrapper was built
    Snapshot(Operations),
    /// The parent API's registry, read at call time
    Registry(OperationRegistry),
}

impl OperationSource {
    fn operations(&self) -> Operations {
        match self {
            OperationSource::Snapshot(ops) => ops.clone(),
            OperationSource::Registry(registry) => registry.snapshot(),
        }
    }

    /// Run `id`, wait for it to finish and translate failure.
    pub(crate) async fn invoke(
        &self,
        id: &str,
        configure: impl FnOnce(&mut Properties) -> Result<(), PropertyError>,
    ) -> Result<OpResult, WrapperError> {
        let ops = self.operations();
        let op = ops
            .get(id)
            .ok_or_else(|| WrapperError::Unavailable(id.to_string()))?;

        let mut props = op.properties();
        configure(&mut props)?;

        let result = operation::execute(op.as_ref(), props);
        result.finished().await;

        if let Some(key) = result
            .errors()
            .iter()
            .find_map(|e| e.downcast_ref::<KeyNotFound>().map(|k| k.0.clone()))
        {
            return Err(WrapperError::NotFound(key));
        }

        result.into_outcome().map_err(|messages| WrapperError::Failed {
            operation: id.to_string(),
            messages,
        })
    }
}

impl From<Operations> for OperationSource {
    fn from(ops: Operations) -> Self {
        OperationSource::Snapshot(ops)
    }
}

impl From<OperationRegistry> for OperationSource {
    fn from(registry: OperationRegistry) -> Self {
        OperationSource::Registry(registry)
    }
}

fn string_output(result: &OpResult, operation: &str, output: &str) -> Result<String, WrapperError> {
    match result.output(output) {
        Some(PropertyValue::String(value)) => Ok(value),
        _ => Err(WrapperError::MissingOutput {
            operation: operation.to_string(),
            output: output.to_string(),
        }),
    }
}

fn strings_output(
    result: &OpResult,
    operation: &str,
    output: &str,
) -> Result<Vec<String>, WrapperError> {
    match result.output(output) {
        Some(PropertyValue::Strings(values)) => Ok(values),
        _ => Err(WrapperError::MissingOutput {
            operation: operation.to_string(),
            output: output.to_string(),
        }),
    }
}
