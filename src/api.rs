//! The assembled API.
//!
//! An [`Api`] owns the global operation registry. Builders are attached to
//! it, activated in order, and register the operations of every handler
//! that validates. Setting and config wrappers built by a builder read from
//! this registry, which is how capabilities provided by one builder (or an
//! earlier activation) reach the handlers of another.

use std::sync::{Arc, RwLock};

use crate::builder::{ActivationReport, Builder, Implementations, SettingsProvider};
use crate::core::operation::{OperationError, Operations};

/// Shared handle to the API's aggregate operation set.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    inner: Arc<RwLock<Operations>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a set of operations; nothing is registered on a collision.
    pub fn register(&self, ops: &Operations) -> Result<(), OperationError> {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .merge(ops)
    }

    /// A point-in-time copy of the registered operations.
    pub fn snapshot(&self) -> Operations {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An API assembled from one or more builders.
#[derive(Default)]
pub struct Api {
    registry: OperationRegistry,
    builders: Vec<Box<dyn Builder>>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a builder and activate the requested implementations on it.
    pub async fn activate(
        &mut self,
        mut builder: Box<dyn Builder>,
        implementations: &Implementations,
        provider: Arc<dyn SettingsProvider>,
    ) -> ActivationReport {
        builder.set_api(self.registry.clone());
        let report = builder.activate(implementations, provider).await;
        tracing::debug!(
            builder = builder.id(),
            activated = ?report.activated,
            "builder activated"
        );
        self.builders.push(builder);
        report
    }

    /// The registry handle shared with builders.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// All registered operations.
    pub fn operations(&self) -> Operations {
        self.registry.snapshot()
    }

    /// Attached builders, in activation order.
    pub fn builders(&self) -> impl Iterator<Item = &dyn Builder> {
        self.builders.iter().map(|b| b.as_ref())
    }

    /// Find an attached builder by id.
    pub fn builder(&self, id: &str) -> Option<&dyn Builder> {
        self.builders().find(|b| b.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::Operation;
    use crate::core::property::Properties;
    use crate::core::result::OpResult;

    struct Nop(&'static str);

    impl Operation for Nop {
        fn id(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Does nothing"
        }

        fn exec(&self, _props: Properties) -> OpResult {
            OpResult::successful()
        }
    }

    fn ops(ids: &[&'static str]) -> Operations {
        let mut ops = Operations::new();
        for id in ids {
            ops.add(Arc::new(Nop(id))).unwrap();
        }
        ops
    }

    #[test]
    fn test_registry_is_shared_between_clones() {
        let registry = OperationRegistry::new();
        let view = registry.clone();

        registry.register(&ops(&["a", "b"])).unwrap();
        assert!(view.contains("a"));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_registry_rejects_collisions() {
        let registry = OperationRegistry::new();
        registry.register(&ops(&["a"])).unwrap();

        assert!(registry.register(&ops(&["a", "c"])).is_err());
        assert!(!registry.contains("c"));
    }
}
