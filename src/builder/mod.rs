//! Builders assemble handlers into an API.
//!
//! A builder receives an ordered list of implementation names and turns each
//! one into validated, registered handlers. Order matters: a handler can only
//! consume wrappers published by handlers built before it.
//!
//! # Usage
//!
//! ```ignore
//! use rigging::api::Api;
//! use rigging::builder::{Implementations, LocalBuilder, BuilderSettings, NoSettings};
//!
//! let mut api = Api::new();
//! let builder = LocalBuilder::new(BuilderSettings::new(paths, config));
//! let report = api
//!     .activate(Box::new(builder), &Implementations::parse("settings,orchestrate"), Arc::new(NoSettings))
//!     .await;
//! for name in &report.skipped {
//!     eprintln!("{} is not available", name);
//! }
//! ```

pub mod local;
pub mod report;
pub mod settings;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::OperationRegistry;
use crate::core::handler::InvalidHandler;
use crate::core::operation::{OperationError, Operations};

pub use local::{LocalBuilder, WrapperCache, DEFAULT_PROJECT_NAME, LOCAL_BUILDER_ID};
pub use report::ActivationReport;
pub use settings::{BuilderSettings, NoSettings, SettingsProvider};

/// Ordered implementation names requested from a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Implementations(Vec<String>);

impl Implementations {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Implementations(names.into_iter().map(Into::into).collect())
    }

    /// Parse a comma-separated list.
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    /// Names in the order they must be built.
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Implementations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Why a handler was not activated.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("handler `{}` is invalid: {}", .0.id, .0.errors.join("; "))]
    Invalid(InvalidHandler),

    #[error("handler `{id}` could not be registered: {source}")]
    Registration {
        id: String,
        #[source]
        source: OperationError,
    },
}

impl From<InvalidHandler> for BuildError {
    fn from(invalid: InvalidHandler) -> Self {
        BuildError::Invalid(invalid)
    }
}

impl From<BuildError> for InvalidHandler {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Invalid(invalid) => invalid,
            BuildError::Registration { id, source } => InvalidHandler {
                id,
                errors: vec![source.to_string()],
            },
        }
    }
}

/// A source of handlers for an [`Api`](crate::api::Api).
#[async_trait]
pub trait Builder: Send + Sync {
    fn id(&self) -> &str;

    /// Attach the parent API's registry.
    fn set_api(&mut self, registry: OperationRegistry);

    /// Build, validate and register handlers for `implementations`, in order.
    async fn activate(
        &mut self,
        implementations: &Implementations,
        provider: Arc<dyn SettingsProvider>,
    ) -> ActivationReport;

    /// Operations of every handler this builder activated.
    fn operations(&self) -> Operations;

    /// Wrappers published by the activated handlers.
    fn wrappers(&self) -> &WrapperCache;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_implementations() {
        let impls = Implementations::parse(" project, orchestrate ,,command");
        let names: Vec<_> = impls.order().collect();
        assert_eq!(names, vec!["project", "orchestrate", "command"]);
        assert_eq!(impls.to_string(), "project,orchestrate,command");
    }
}
