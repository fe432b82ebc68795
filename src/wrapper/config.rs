//! Config wrapper: raw named configuration documents.

use async_trait::async_trait;

use super::{string_output, strings_output, OperationSource, WrapperError};

pub const CONFIG_GET: &str = "config.get";
pub const CONFIG_LIST: &str = "config.list";

#[async_trait]
pub trait ConfigWrapper: Send + Sync {
    /// The raw contents of the config document `key`.
    async fn get(&self, key: &str) -> Result<String, WrapperError>;

    async fn list(&self) -> Result<Vec<String>, WrapperError>;
}

/// Config wrapper over the `config.*` operations.
#[derive(Clone)]
pub struct SimpleConfigWrapper {
    source: OperationSource,
}

impl SimpleConfigWrapper {
    pub fn new(source: impl Into<OperationSource>) -> Self {
        SimpleConfigWrapper {
            source: source.into(),
        }
    }
}

#[async_trait]
impl ConfigWrapper for SimpleConfigWrapper {
    async fn get(&self, key: &str) -> Result<String, WrapperError> {
        let result = self
            .source
            .invoke(CONFIG_GET, |props| props.set("key", key))
            .await?;
        string_output(&result, CONFIG_GET, "value")
    }

    async fn list(&self) -> Result<Vec<String>, WrapperError> {
        let result = self.source.invoke(CONFIG_LIST, |_| Ok(())).await?;
        strings_output(&result, CONFIG_LIST, "keys")
    }
}

/// Stand-in used when no parent API is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConfigWrapper;

#[async_trait]
impl ConfigWrapper for NoopConfigWrapper {
    async fn get(&self, key: &str) -> Result<String, WrapperError> {
        Err(WrapperError::NotFound(key.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, WrapperError> {
        Ok(Vec::new())
    }
}
