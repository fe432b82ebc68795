//! Compose execution backend.
//!
//! A [`ComposeContext`] binds a project name, its definition files, the
//! compose program and the output sinks. It is expensive to derive (the
//! project name comes from settings, files from a filesystem scan), so the
//! builder constructs one per session and every handler that drives
//! containers shares it. [`ComposeOperation`]s are cheap views over it.

pub mod context;
pub mod operation;

use thiserror::Error;

pub use context::{ComposeContext, ExecEnvironment, OutputSink};
pub use operation::{ComposeAction, ComposeOperation};

/// Backend errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("`{command}` exited with status {}", code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    Exit { command: String, code: Option<i32> },

    #[error("failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("no definition files found (looked for {})", .searched.join(", "))]
    NoDefinitionFiles { searched: Vec<String> },
}
