//! Bring the project's services up and down.

use std::sync::Arc;

use super::probe_definition_files;
use crate::backend::{ComposeAction, ComposeContext, ComposeOperation};
use crate::core::handler::Handler;
use crate::core::operation::Operations;
use crate::core::result::OpResult;
use crate::wrapper::orchestrate::{
    ORCHESTRATE_DOWN, ORCHESTRATE_START, ORCHESTRATE_STOP, ORCHESTRATE_UP,
};
use crate::wrapper::SimpleOrchestrateWrapper;

pub const ORCHESTRATE_HANDLER_ID: &str = "local.orchestrate";
pub const MONITOR_LOGS: &str = "monitor.logs";

pub struct OrchestrateHandler {
    context: Arc<ComposeContext>,
}

impl OrchestrateHandler {
    pub fn new(context: Arc<ComposeContext>) -> Self {
        OrchestrateHandler { context }
    }

    pub fn context(&self) -> &Arc<ComposeContext> {
        &self.context
    }

    /// The wrapper this handler publishes.
    pub fn orchestrate_wrapper(&self) -> SimpleOrchestrateWrapper {
        SimpleOrchestrateWrapper::new(self.operations())
    }
}

impl Handler for OrchestrateHandler {
    fn id(&self) -> &str {
        ORCHESTRATE_HANDLER_ID
    }

    fn validate(&self) -> OpResult {
        probe_definition_files(Arc::clone(&self.context))
    }

    fn operations(&self) -> Operations {
        let mut ops = Operations::new();
        for (id, action) in [
            (ORCHESTRATE_UP, ComposeAction::Up),
            (ORCHESTRATE_DOWN, ComposeAction::Down),
            (ORCHESTRATE_START, ComposeAction::Start),
            (ORCHESTRATE_STOP, ComposeAction::Stop),
            (MONITOR_LOGS, ComposeAction::Logs),
        ] {
            let _ = ops.add(Arc::new(ComposeOperation::new(
                id,
                action,
                Arc::clone(&self.context),
            )));
        }
        ops
    }
}
