//! Operations and operation sets.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::property::{Properties, PropertyError};
use crate::core::result::OpResult;

/// A named, described unit of work with typed properties.
///
/// `exec` returns immediately with an [`OpResult`]; implementations that do
/// I/O finish the result from a background task.
pub trait Operation: Send + Sync {
    /// Stable id, unique within one [`Operations`] set.
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// A fresh property set with defaults applied.
    fn properties(&self) -> Properties {
        Properties::new()
    }

    fn validate(&self) -> OpResult {
        OpResult::successful()
    }

    fn exec(&self, props: Properties) -> OpResult;
}

/// Operation set errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("operation `{0}` is already registered")]
    Duplicate(String),

    #[error("operations already registered: {}", .0.join(", "))]
    Collisions(Vec<String>),

    #[error("operation `{0}` not found")]
    NotFound(String),

    #[error("operation `{id}` is missing required properties: {}", .missing.join(", "))]
    Unresolved { id: String, missing: Vec<String> },
}

/// Run an operation once all its required properties are resolvable.
pub fn execute(op: &dyn Operation, props: Properties) -> OpResult {
    let missing: Vec<String> = props.unresolved().into_iter().map(String::from).collect();
    if !missing.is_empty() {
        return OpResult::failed(OperationError::Unresolved {
            id: op.id().to_string(),
            missing,
        });
    }
    op.exec(props)
}

/// Insertion-ordered, id-keyed collection of operations.
#[derive(Clone, Default)]
pub struct Operations {
    ops: Vec<Arc<dyn Operation>>,
    index: HashMap<String, usize>,
}

impl Operations {
    pub fn new() -> Self {
        Operations {
            ops: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add an operation, rejecting duplicate ids.
    pub fn add(&mut self, op: Arc<dyn Operation>) -> Result<(), OperationError> {
        let id = op.id().to_string();
        if self.index.contains_key(&id) {
            return Err(OperationError::Duplicate(id));
        }
        self.index.insert(id, self.ops.len());
        self.ops.push(op);
        Ok(())
    }

    /// Add every operation of `other`.
    ///
    /// Nothing is added if any id collides; the error lists every collision.
    pub fn merge(&mut self, other: &Operations) -> Result<(), OperationError> {
        let collisions: Vec<String> = other
            .ids()
            .filter(|id| self.contains(id))
            .map(String::from)
            .collect();
        if !collisions.is_empty() {
            return Err(OperationError::Collisions(collisions));
        }
        for op in other.iter() {
            self.add(Arc::clone(op))?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Operation>> {
        self.index.get(id).map(|&i| &self.ops[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up an operation, apply `configure` to its properties and run it.
    pub fn run(
        &self,
        id: &str,
        configure: impl FnOnce(&mut Properties) -> Result<(), PropertyError>,
    ) -> OpResult {
        let Some(op) = self.get(id) else {
            return OpResult::failed(OperationError::NotFound(id.to_string()));
        };
        let mut props = op.properties();
        if let Err(e) = configure(&mut props) {
            return OpResult::failed(e);
        }
        execute(op.as_ref(), props)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().map(|op| op.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Operation>> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for Operations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property::{Property, PropertyKind};

    struct Echo {
        id: &'static str,
    }

    impl Operation for Echo {
        fn id(&self) -> &str {
            self.id
        }

        fn description(&self) -> &str {
            "Echo the `message` property"
        }

        fn properties(&self) -> Properties {
            Properties::new().with(Property::new("message", PropertyKind::String).required())
        }

        fn exec(&self, props: Properties) -> OpResult {
            let (mut producer, result) = OpResult::pending();
            match props.require("message").and_then(|p| p.as_str()) {
                Ok(message) => producer.set_output("message", message),
                Err(e) => producer.fail(e),
            }
            producer.finish();
            result
        }
    }

    fn echo(id: &'static str) -> Arc<dyn Operation> {
        Arc::new(Echo { id })
    }

    #[test]
    fn test_insertion_order_and_duplicates() {
        let mut ops = Operations::new();
        ops.add(echo("b")).unwrap();
        ops.add(echo("a")).unwrap();
        assert_eq!(ops.add(echo("b")), Err(OperationError::Duplicate("b".into())));

        let ids: Vec<_> = ops.ids().collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut ops = Operations::new();
        ops.add(echo("a")).unwrap();

        let mut other = Operations::new();
        other.add(echo("c")).unwrap();
        other.add(echo("a")).unwrap();

        assert_eq!(
            ops.merge(&other),
            Err(OperationError::Collisions(vec!["a".into()]))
        );
        assert_eq!(ops.len(), 1);
        assert!(!ops.contains("c"));
    }

    #[test]
    fn test_run_refuses_unresolved_properties() {
        let mut ops = Operations::new();
        ops.add(echo("echo")).unwrap();

        let result = ops.run("echo", |_| Ok(()));
        assert!(result.is_finished());
        assert!(!result.success());
        assert!(result.error_messages()[0].contains("message"));

        let result = ops.run("echo", |props| props.set("message", "hi"));
        assert!(result.success());
        assert_eq!(result.output("message"), Some("hi".into()));
    }

    #[test]
    fn test_run_unknown_operation() {
        let ops = Operations::new();
        let result = ops.run("missing", |_| Ok(()));
        assert!(!result.success());
    }
}
