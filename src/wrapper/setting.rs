//! Setting wrapper: string key/value lookups.

use async_trait::async_trait;

use super::{string_output, strings_output, OperationSource, WrapperError};

pub const SETTING_GET: &str = "setting.get";
pub const SETTING_SET: &str = "setting.set";
pub const SETTING_LIST: &str = "setting.list";

#[async_trait]
pub trait SettingWrapper: Send + Sync {
    async fn get(&self, key: &str) -> Result<String, WrapperError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), WrapperError>;

    async fn list(&self) -> Result<Vec<String>, WrapperError>;
}

/// Setting wrapper over the `setting.*` operations.
#[derive(Clone)]
pub struct SimpleSettingWrapper {
    source: OperationSource,
}

impl SimpleSettingWrapper {
    pub fn new(source: impl Into<OperationSource>) -> Self {
        SimpleSettingWrapper {
            source: source.into(),
        }
    }
}

#[async_trait]
impl SettingWrapper for SimpleSettingWrapper {
    async fn get(&self, key: &str) -> Result<String, WrapperError> {
        let result = self
            .source
            .invoke(SETTING_GET, |props| props.set("key", key))
            .await?;
        string_output(&result, SETTING_GET, "value")
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), WrapperError> {
        self.source
            .invoke(SETTING_SET, |props| {
                props.set("key", key)?;
                props.set("value", value)
            })
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, WrapperError> {
        let result = self.source.invoke(SETTING_LIST, |_| Ok(())).await?;
        strings_output(&result, SETTING_LIST, "keys")
    }
}

/// Stand-in used when no parent API is available: nothing is ever found.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSettingWrapper;

#[async_trait]
impl SettingWrapper for NoopSettingWrapper {
    async fn get(&self, key: &str) -> Result<String, WrapperError> {
        Err(WrapperError::NotFound(key.to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), WrapperError> {
        Err(WrapperError::Unavailable(SETTING_SET.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, WrapperError> {
        Ok(Vec::new())
    }
}
