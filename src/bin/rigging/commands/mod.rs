//! Command implementations

pub mod command;
pub mod completions;
pub mod exec;
pub mod init;
pub mod list;
pub mod monitor;
pub mod orchestrate;
pub mod setting;

use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tokio::runtime::Runtime;

use crate::cli::GlobalArgs;
use rigging::builder::{ActivationReport, BuilderSettings, Implementations, LocalBuilder};
use rigging::core::{OpResult, Properties, PropertyError};
use rigging::util::{Config, GlobalContext};
use rigging::wrapper::{CommandWrapper, OrchestrateWrapper};
use rigging::Api;

/// Implementations activated when neither the flag nor the config names any.
pub const DEFAULT_IMPLEMENTATIONS: &str = "settings,config,project,orchestrate,command";

/// An activated API for one CLI invocation.
pub struct Session {
    runtime: Runtime,
    api: Api,
    report: ActivationReport,
}

impl Session {
    /// Activate the configured implementations for the current project.
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        Self::open_with(global, None)
    }

    /// Activate exactly `names`, ignoring the flag and the config.
    pub fn open_only(global: &GlobalArgs, names: &str) -> Result<Self> {
        Self::open_with(global, Some(Implementations::parse(names)))
    }

    fn open_with(global: &GlobalArgs, fixed: Option<Implementations>) -> Result<Self> {
        let ctx = GlobalContext::new()?;

        let paths = ctx.project();
        let config = ctx.load_config(&paths);
        let implementations = fixed.unwrap_or_else(|| select_implementations(global, &config));
        tracing::debug!(
            root = %paths.root().display(),
            %implementations,
            "activating"
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        let mut api = Api::new();
        let builder = LocalBuilder::new(BuilderSettings::new(paths, config.clone()));
        let report =
            runtime.block_on(api.activate(Box::new(builder), &implementations, Arc::new(config)));

        Ok(Session {
            runtime,
            api,
            report,
        })
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Run an operation to completion.
    pub fn run(
        &self,
        id: &str,
        configure: impl FnOnce(&mut Properties) -> Result<(), PropertyError>,
    ) -> Result<OpResult> {
        let ops = self.api.operations();
        if !ops.contains(id) {
            bail!(
                "operation `{}` is not available{}",
                id,
                self.unavailable_hint()
            );
        }

        let result = {
            let _runtime = self.runtime.enter();
            ops.run(id, configure)
        };
        self.block_on(result.finished());
        result
            .into_outcome()
            .map_err(|errors| anyhow!("`{}` failed: {}", id, errors.join("; ")))
    }

    /// The published orchestrate wrapper.
    pub fn orchestrate(&self) -> Result<Arc<dyn OrchestrateWrapper>> {
        self.api
            .builders()
            .find_map(|b| b.wrappers().orchestrate.clone())
            .ok_or_else(|| anyhow!("orchestration is not available{}", self.unavailable_hint()))
    }

    /// The published command wrapper.
    pub fn commands(&self) -> Result<Arc<dyn CommandWrapper>> {
        self.api
            .builders()
            .find_map(|b| b.wrappers().command.clone())
            .ok_or_else(|| anyhow!("commands are not available{}", self.unavailable_hint()))
    }

    fn unavailable_hint(&self) -> String {
        if self.report.failed.is_empty() {
            "\nhelp: Run `rigging list` to see available operations".to_string()
        } else {
            let failed: Vec<String> = self
                .report
                .failed
                .iter()
                .map(|f| format!("  {}: {}", f.id, f.errors.join("; ")))
                .collect();
            format!("\nthese handlers failed to activate:\n{}", failed.join("\n"))
        }
    }
}

/// The flag wins over the config, which wins over the default.
fn select_implementations(global: &GlobalArgs, config: &Config) -> Implementations {
    if let Some(list) = &global.implementations {
        return Implementations::parse(list);
    }
    if let Some(names) = &config.api.implementations {
        return Implementations::new(names.iter().cloned());
    }
    Implementations::parse(DEFAULT_IMPLEMENTATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_implementations() {
        let mut global = GlobalArgs::default();
        let mut config = Config::default();

        let names = select_implementations(&global, &config);
        assert_eq!(names.to_string(), DEFAULT_IMPLEMENTATIONS);

        config.api.implementations = Some(vec!["settings".to_string()]);
        assert_eq!(select_implementations(&global, &config).to_string(), "settings");

        global.implementations = Some("config,command".to_string());
        assert_eq!(
            select_implementations(&global, &config).to_string(),
            "config,command"
        );
    }
}
