//! Inspect running services.

use std::sync::Arc;

use super::probe_definition_files;
use crate::backend::{ComposeAction, ComposeContext, ComposeOperation};
use crate::core::handler::Handler;
use crate::core::operation::Operations;
use crate::core::result::OpResult;

pub const MONITOR_HANDLER_ID: &str = "local.monitor";
pub const MONITOR_PS: &str = "monitor.ps";

pub struct MonitorHandler {
    context: Arc<ComposeContext>,
}

impl MonitorHandler {
    pub fn new(context: Arc<ComposeContext>) -> Self {
        MonitorHandler { context }
    }
}

impl Handler for MonitorHandler {
    fn id(&self) -> &str {
        MONITOR_HANDLER_ID
    }

    fn validate(&self) -> OpResult {
        probe_definition_files(Arc::clone(&self.context))
    }

    fn operations(&self) -> Operations {
        let mut ops = Operations::new();
        let _ = ops.add(Arc::new(ComposeOperation::new(
            MONITOR_PS,
            ComposeAction::Ps,
            Arc::clone(&self.context),
        )));
        ops
    }
}
