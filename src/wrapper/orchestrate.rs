//! Orchestrate wrapper: bring the project's services up and down.

use async_trait::async_trait;

use super::{OperationSource, WrapperError};

pub const ORCHESTRATE_UP: &str = "orchestrate.up";
pub const ORCHESTRATE_DOWN: &str = "orchestrate.down";
pub const ORCHESTRATE_START: &str = "orchestrate.start";
pub const ORCHESTRATE_STOP: &str = "orchestrate.stop";

#[async_trait]
pub trait OrchestrateWrapper: Send + Sync {
    async fn up(&self) -> Result<(), WrapperError>;

    async fn down(&self) -> Result<(), WrapperError>;

    async fn start(&self) -> Result<(), WrapperError>;

    async fn stop(&self) -> Result<(), WrapperError>;
}

/// Orchestrate wrapper over the `orchestrate.*` operations.
#[derive(Clone)]
pub struct SimpleOrchestrateWrapper {
    source: OperationSource,
}

impl SimpleOrchestrateWrapper {
    pub fn new(source: impl Into<OperationSource>) -> Self {
        SimpleOrchestrateWrapper {
            source: source.into(),
        }
    }

    async fn run(&self, id: &str) -> Result<(), WrapperError> {
        self.source.invoke(id, |_| Ok(())).await.map(|_| ())
    }
}

#[async_trait]
impl OrchestrateWrapper for SimpleOrchestrateWrapper {
    async fn up(&self) -> Result<(), WrapperError> {
        self.run(ORCHESTRATE_UP).await
    }

    async fn down(&self) -> Result<(), WrapperError> {
        self.run(ORCHESTRATE_DOWN).await
    }

    async fn start(&self) -> Result<(), WrapperError> {
        self.run(ORCHESTRATE_START).await
    }

    async fn stop(&self) -> Result<(), WrapperError> {
        self.run(ORCHESTRATE_STOP).await
    }
}
