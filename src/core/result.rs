//! Asynchronous completion tokens for validation and execution.
//!
//! A result is split in two halves. The [`ResultProducer`] records the
//! outcome, errors and outputs and closes the result exactly once; any
//! number of [`OpResult`] handles observe it and can wait for completion.
//!
//! The producer may finish before anyone waits (synchronous checks) or from
//! a background task; waiters block on the completion signal either way.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::core::property::PropertyValue;

/// Tri-state outcome of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Default)]
struct State {
    outcome: Outcome,
    errors: Vec<Arc<anyhow::Error>>,
    outputs: BTreeMap<String, PropertyValue>,
    finished: bool,
}

/// Returned when a bounded wait on a result expires.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("result did not complete within {0:?}")]
pub struct Timeout(pub Duration);

/// Consumer side of a result.
#[derive(Clone)]
pub struct OpResult {
    rx: watch::Receiver<State>,
}

impl OpResult {
    /// Create an open result and the producer that will close it.
    pub fn pending() -> (ResultProducer, OpResult) {
        let (tx, rx) = watch::channel(State::default());
        (ResultProducer { tx: Some(tx) }, OpResult { rx })
    }

    /// A result that is already closed with success.
    pub fn successful() -> Self {
        let (mut producer, result) = Self::pending();
        producer.mark_success();
        producer.finish();
        result
    }

    /// A result that is already closed with a single error.
    pub fn failed(err: impl Into<anyhow::Error>) -> Self {
        let (mut producer, result) = Self::pending();
        producer.fail(err);
        producer.finish();
        result
    }

    pub fn outcome(&self) -> Outcome {
        self.rx.borrow().outcome
    }

    pub fn success(&self) -> bool {
        self.outcome() == Outcome::Success
    }

    pub fn is_finished(&self) -> bool {
        self.rx.borrow().finished
    }

    /// Errors in the order they were added.
    pub fn errors(&self) -> Vec<Arc<anyhow::Error>> {
        self.rx.borrow().errors.clone()
    }

    /// Errors rendered with their full context chain.
    pub fn error_messages(&self) -> Vec<String> {
        self.rx
            .borrow()
            .errors
            .iter()
            .map(|e| format!("{:#}", e))
            .collect()
    }

    /// Run `work` on a blocking task and close the result when it returns.
    ///
    /// Outside a tokio runtime `work` runs inline and the returned result is
    /// already closed.
    pub fn spawn_blocking<F>(work: F) -> Self
    where
        F: FnOnce(&mut ResultProducer) + Send + 'static,
    {
        let (mut producer, result) = Self::pending();
        let task = move || {
            work(&mut producer);
            producer.finish();
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(task);
            }
            Err(_) => task(),
        }
        result
    }

    /// Drive `work` on the current tokio runtime and close the result with
    /// its outcome.
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let (mut producer, result) = Self::pending();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = work.await {
                        producer.fail(e);
                    }
                    producer.finish();
                });
            }
            Err(_) => {
                producer.fail(anyhow::anyhow!("no async runtime available"));
                producer.finish();
            }
        }
        result
    }

    /// An output value set by the producer.
    pub fn output(&self, name: &str) -> Option<PropertyValue> {
        self.rx.borrow().outputs.get(name).cloned()
    }

    /// All outputs, by name.
    pub fn outputs(&self) -> BTreeMap<String, PropertyValue> {
        self.rx.borrow().outputs.clone()
    }

    /// Wait until the producer closes the result.
    pub async fn finished(&self) {
        let mut rx = self.rx.clone();
        // The producer always marks the state finished before its sender is
        // dropped, so an error here still means the state is final.
        let _ = rx.wait_for(|state| state.finished).await;
    }

    /// Wait for completion, giving up after `limit`.
    pub async fn wait_timeout(&self, limit: Duration) -> Result<(), Timeout> {
        tokio::time::timeout(limit, self.finished())
            .await
            .map_err(|_| Timeout(limit))
    }

    /// Convert a finished result into a plain `Result`.
    pub fn into_outcome(self) -> Result<OpResult, Vec<String>> {
        if self.success() {
            Ok(self)
        } else {
            let mut messages = self.error_messages();
            if messages.is_empty() {
                messages.push(match self.outcome() {
                    Outcome::Pending => "operation has not completed".to_string(),
                    _ => "operation failed without reporting an error".to_string(),
                });
            }
            Err(messages)
        }
    }
}

impl fmt::Debug for OpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.rx.borrow();
        f.debug_struct("OpResult")
            .field("outcome", &state.outcome)
            .field("finished", &state.finished)
            .field("errors", &state.errors.len())
            .field("outputs", &state.outputs)
            .finish()
    }
}

/// Producer side of a result.
///
/// Closing is tied to ownership: [`ResultProducer::finish`] consumes the
/// producer, and a producer dropped without finishing closes the result as
/// failed.
pub struct ResultProducer {
    tx: Option<watch::Sender<State>>,
}

impl ResultProducer {
    fn modify(&mut self, f: impl FnOnce(&mut State)) {
        if let Some(tx) = &self.tx {
            tx.send_modify(f);
        }
    }

    pub fn mark_success(&mut self) {
        self.modify(|s| s.outcome = Outcome::Success);
    }

    pub fn mark_failed(&mut self) {
        self.modify(|s| s.outcome = Outcome::Failure);
    }

    pub fn add_error(&mut self, err: impl Into<anyhow::Error>) {
        let err = Arc::new(err.into());
        self.modify(|s| s.errors.push(err));
    }

    /// Add an error and mark the result failed.
    pub fn fail(&mut self, err: impl Into<anyhow::Error>) {
        self.add_error(err);
        self.mark_failed();
    }

    pub fn set_output(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let (name, value) = (name.into(), value.into());
        self.modify(|s| {
            s.outputs.insert(name, value);
        });
    }

    /// Close the result.
    ///
    /// A result still pending at this point resolves to failure if any error
    /// was added and to success otherwise.
    pub fn finish(mut self) {
        if let Some(tx) = self.tx.take() {
            tx.send_modify(|s| {
                if s.outcome == Outcome::Pending {
                    s.outcome = if s.errors.is_empty() {
                        Outcome::Success
                    } else {
                        Outcome::Failure
                    };
                }
                s.finished = true;
            });
        }
    }
}

impl Drop for ResultProducer {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tx.send_modify(|s| {
                s.errors.push(Arc::new(anyhow::anyhow!(
                    "result producer dropped before completion"
                )));
                s.outcome = Outcome::Failure;
                s.finished = true;
            });
        }
    }
}
