//! The local builder: handlers backed by the project directory and a
//! compose program on this machine.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::settings::{BuilderSettings, SettingsProvider, PROVIDER_COMPOSE_FILES};
use super::{ActivationReport, BuildError, Builder, Implementations};
use crate::api::OperationRegistry;
use crate::backend::{ComposeContext, ExecEnvironment};
use crate::core::handler::{self, Handler, InvalidHandler, ValidHandler};
use crate::core::operation::Operations;
use crate::handlers::{
    CommandHandler, ConfigHandler, MonitorHandler, OrchestrateHandler, ProjectHandler,
    SettingHandler,
};
use crate::util::fs::glob_files;
use crate::util::process::resolve_program;
use crate::wrapper::{
    CommandWrapper, ConfigWrapper, NoopConfigWrapper, NoopSettingWrapper,
    OrchestrateWrapper, SettingWrapper, SimpleConfigWrapper, SimpleSettingWrapper,
};

pub const LOCAL_BUILDER_ID: &str = "local";

/// Project name used when no setting or config provides one.
pub const DEFAULT_PROJECT_NAME: &str = "default";

/// Setting key holding the compose project name.
pub const PROJECT_SETTING: &str = "Project";

/// Wrappers published by handlers this builder activated.
#[derive(Clone, Default)]
pub struct WrapperCache {
    pub command: Option<Arc<dyn CommandWrapper>>,
    pub orchestrate: Option<Arc<dyn OrchestrateWrapper>>,
}

/// Builds handlers for a local project.
pub struct LocalBuilder {
    settings: Arc<BuilderSettings>,
    parent: Option<OperationRegistry>,
    provider: Arc<dyn SettingsProvider>,
    handlers: Vec<Arc<dyn Handler>>,
    operations: Operations,
    compose: OnceCell<Arc<ComposeContext>>,
    setting: OnceLock<Arc<dyn SettingWrapper>>,
    config: OnceLock<Arc<dyn ConfigWrapper>>,
    wrappers: WrapperCache,
}

impl LocalBuilder {
    pub fn new(settings: BuilderSettings) -> Self {
        LocalBuilder {
            settings: Arc::new(settings),
            parent: None,
            provider: Arc::new(super::NoSettings),
            handlers: Vec::new(),
            operations: Operations::new(),
            compose: OnceCell::new(),
            setting: OnceLock::new(),
            config: OnceLock::new(),
            wrappers: WrapperCache::default(),
        }
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    /// Ids of the activated handlers, in activation order.
    pub fn handler_ids(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.id()).collect()
    }

    /// The setting wrapper, bound to the parent API on first use.
    pub fn setting_wrapper(&self) -> Arc<dyn SettingWrapper> {
        Arc::clone(self.setting.get_or_init(|| match &self.parent {
            Some(registry) => {
                tracing::debug!("binding setting wrapper to parent API");
                Arc::new(SimpleSettingWrapper::new(registry.clone()))
            }
            None => {
                tracing::error!("No parent API set, settings are unavailable");
                Arc::new(NoopSettingWrapper)
            }
        }))
    }

    /// The config wrapper, bound to the parent API on first use.
    pub fn config_wrapper(&self) -> Arc<dyn ConfigWrapper> {
        Arc::clone(self.config.get_or_init(|| match &self.parent {
            Some(registry) => {
                tracing::debug!("binding config wrapper to parent API");
                Arc::new(SimpleConfigWrapper::new(registry.clone()))
            }
            None => {
                tracing::error!("No parent API set, config is unavailable");
                Arc::new(NoopConfigWrapper)
            }
        }))
    }

    /// The compose context shared by every handler of this builder.
    ///
    /// Built on first call; later calls return the same instance.
    pub async fn compose_context(&self) -> Arc<ComposeContext> {
        let context = self
            .compose
            .get_or_init(|| async { Arc::new(self.build_compose_context().await) })
            .await;
        Arc::clone(context)
    }

    async fn build_compose_context(&self) -> ComposeContext {
        let paths = self.settings.paths();
        let config = self.settings.config();

        let project_name = match self.setting_wrapper().get(PROJECT_SETTING).await {
            Ok(name) => name,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read the `{}` setting", PROJECT_SETTING);
                config
                    .project
                    .name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
            }
        };

        let mut files = Vec::new();
        let root_file = paths.compose_file();
        if root_file.is_file() {
            files.push(root_file);
        }
        let mut patterns = config.compose.files.clone();
        if let Some(extra) = self.provider.get(PROVIDER_COMPOSE_FILES) {
            patterns.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from),
            );
        }
        for file in glob_files(paths.root(), &patterns) {
            if !files.contains(&file) {
                files.push(file);
            }
        }

        let environment = ExecEnvironment::new(resolve_program(config.compose_program()), paths.root())
            .with_args(config.compose_args())
            .with_env(config.compose.env.clone());

        tracing::debug!(project = %project_name, files = files.len(), "compose context built");

        ComposeContext::new(
            project_name,
            files,
            environment,
            self.settings.stdout().clone(),
            self.settings.stderr().clone(),
            paths.clone(),
        )
    }

    fn validate_timeout(&self) -> Duration {
        self.settings.validate_timeout(self.provider.as_ref())
    }

    /// Validate a handler and register its operations.
    async fn install<H: Handler + 'static>(
        &mut self,
        handler: H,
        report: &mut ActivationReport,
    ) -> Option<ValidHandler<H>> {
        match self.try_install(handler).await {
            Ok(valid) => {
                report.activated.push(valid.id().to_string());
                Some(valid)
            }
            Err(e) => {
                let failed: InvalidHandler = e.into();
                tracing::warn!(
                    handler = %failed.id,
                    "Handler failed validation: {}",
                    failed.errors.join("; ")
                );
                report.failed.push(failed);
                None
            }
        }
    }

    async fn try_install<H: Handler + 'static>(
        &mut self,
        handler: H,
    ) -> Result<ValidHandler<H>, BuildError> {
        let valid = handler::validate(handler, self.validate_timeout()).await?;

        let ops = valid.operations();
        let mut merged = self.operations.clone();
        merged.merge(&ops).map_err(|source| BuildError::Registration {
            id: valid.id().to_string(),
            source,
        })?;
        if let Some(parent) = &self.parent {
            parent.register(&ops).map_err(|source| BuildError::Registration {
                id: valid.id().to_string(),
                source,
            })?;
        }
        self.operations = merged;
        self.handlers.push(valid.shared());

        Ok(valid)
    }

    async fn build(&mut self, name: &str, report: &mut ActivationReport) {
        match name {
            "settings" => {
                let handler = SettingHandler::new(Arc::clone(&self.settings));
                self.install(handler, report).await;
            }
            "config" => {
                let handler = ConfigHandler::new(Arc::clone(&self.settings));
                self.install(handler, report).await;
            }
            "project" => {
                let handler = ProjectHandler::new(Arc::clone(&self.settings));
                self.install(handler, report).await;
            }
            "orchestrate" => {
                let context = self.compose_context().await;
                let handler = OrchestrateHandler::new(Arc::clone(&context));
                if let Some(valid) = self.install(handler, report).await {
                    self.wrappers.orchestrate = Some(Arc::new(valid.handler().orchestrate_wrapper()));
                }
                self.install(MonitorHandler::new(context), report).await;
            }
            "command" => {
                let context = self.compose_context().await;
                let handler = CommandHandler::new(context, self.config_wrapper());
                if let Some(valid) = self.install(handler, report).await {
                    self.wrappers.command = Some(Arc::new(valid.handler().command_wrapper()));
                }
            }
            other => {
                tracing::error!(implementation = other, "Local builder implementation not available");
                report.skipped.push(other.to_string());
            }
        }
    }
}

#[async_trait]
impl Builder for LocalBuilder {
    fn id(&self) -> &str {
        LOCAL_BUILDER_ID
    }

    fn set_api(&mut self, registry: OperationRegistry) {
        self.parent = Some(registry);
    }

    async fn activate(
        &mut self,
        implementations: &Implementations,
        provider: Arc<dyn SettingsProvider>,
    ) -> ActivationReport {
        self.provider = provider;

        let mut report = ActivationReport::default();
        for name in implementations.order() {
            self.build(name, &mut report).await;
        }
        report
    }

    fn operations(&self) -> Operations {
        self.operations.clone()
    }

    fn wrappers(&self) -> &WrapperCache {
        &self.wrappers
    }
}
