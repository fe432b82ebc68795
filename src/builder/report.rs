//! Activation summaries.

use crate::core::handler::InvalidHandler;
use crate::core::result::OpResult;

/// What one `activate` call did.
///
/// `result` is the aggregate outcome. Activation favours availability, so
/// it succeeds even when names were skipped or handlers failed; those are
/// listed separately so callers can tell a partial build from a full one.
#[derive(Debug, Clone)]
pub struct ActivationReport {
    pub result: OpResult,
    /// Ids of handlers that validated and were registered, in build order
    pub activated: Vec<String>,
    /// Requested names with no matching build routine
    pub skipped: Vec<String>,
    /// Handlers that failed validation or registration
    pub failed: Vec<InvalidHandler>,
}

impl ActivationReport {
    pub fn success(&self) -> bool {
        self.result.success()
    }

    /// Whether every requested capability was built.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

impl Default for ActivationReport {
    fn default() -> Self {
        ActivationReport {
            result: OpResult::successful(),
            activated: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}
