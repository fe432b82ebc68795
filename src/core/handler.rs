//! Handlers and their validation lifecycle.
//!
//! Every handler goes through the same two-phase protocol:
//!
//! ```text
//! Constructed ──validate()──▶ Validating ──┬──▶ Valid    (registered)
//!                                          └──▶ Invalid  (discarded)
//! ```
//!
//! [`validate`] drives the transition and is the only way to obtain a
//! [`ValidHandler`], so operations can only be collected from handlers that
//! passed validation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::operation::Operations;
use crate::core::result::OpResult;

/// A named unit owning a set of operations.
pub trait Handler: Send + Sync {
    fn id(&self) -> &str;

    /// Check that the handler can work.
    ///
    /// Must not perform side effects beyond probing; may finish the result
    /// from a background task.
    fn validate(&self) -> OpResult;

    /// The handler's operations. Only called after successful validation.
    fn operations(&self) -> Operations;
}

/// Lifecycle state of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Constructed,
    Validating,
    Valid,
    Invalid,
}

impl fmt::Display for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandlerState::Constructed => "constructed",
            HandlerState::Validating => "validating",
            HandlerState::Valid => "valid",
            HandlerState::Invalid => "invalid",
        };
        f.write_str(s)
    }
}

/// A handler that passed validation.
pub struct ValidHandler<H> {
    handler: Arc<H>,
}

impl<H: Handler + 'static> ValidHandler<H> {
    pub fn id(&self) -> &str {
        self.handler.id()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn operations(&self) -> Operations {
        self.handler.operations()
    }

    /// The handler with its concrete type erased, for storage in a registry.
    pub fn shared(&self) -> Arc<dyn Handler> {
        Arc::clone(&self.handler) as Arc<dyn Handler>
    }
}

/// A handler that failed validation; only its id and errors survive.
#[derive(Debug, Clone)]
pub struct InvalidHandler {
    pub id: String,
    pub errors: Vec<String>,
}

/// Validate a constructed handler, waiting at most `limit` for the result.
pub async fn validate<H: Handler + 'static>(
    handler: H,
    limit: Duration,
) -> Result<ValidHandler<H>, InvalidHandler> {
    let id = handler.id().to_string();
    tracing::debug!(handler = %id, state = %HandlerState::Constructed, "handler built");

    tracing::debug!(handler = %id, state = %HandlerState::Validating, "validating handler");
    let result = handler.validate();

    if let Err(timeout) = result.wait_timeout(limit).await {
        tracing::debug!(handler = %id, state = %HandlerState::Invalid, "validation timed out");
        return Err(InvalidHandler {
            id,
            errors: vec![timeout.to_string()],
        });
    }

    match result.into_outcome() {
        Ok(_) => {
            tracing::debug!(handler = %id, state = %HandlerState::Valid, "handler validated");
            Ok(ValidHandler {
                handler: Arc::new(handler),
            })
        }
        Err(errors) => {
            tracing::debug!(handler = %id, state = %HandlerState::Invalid, "handler rejected");
            Err(InvalidHandler { id, errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        ok: bool,
        hang: bool,
    }

    impl Handler for Probe {
        fn id(&self) -> &str {
            "test.probe"
        }

        fn validate(&self) -> OpResult {
            if self.hang {
                // Keep the producer alive so the result stays open.
                let (producer, result) = OpResult::pending();
                std::mem::forget(producer);
                return result;
            }
            let ok = self.ok;
            OpResult::spawn_blocking(move |producer| {
                if !ok {
                    producer.fail(anyhow::anyhow!("probe failed"));
                }
            })
        }

        fn operations(&self) -> Operations {
            Operations::new()
        }
    }

    const LIMIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_valid_handler() {
        let valid = validate(Probe { ok: true, hang: false }, LIMIT).await.unwrap();
        assert_eq!(valid.id(), "test.probe");
        assert!(valid.operations().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_handler_keeps_errors() {
        let invalid = validate(Probe { ok: false, hang: false }, LIMIT)
            .await
            .err()
            .unwrap();
        assert_eq!(invalid.id, "test.probe");
        assert_eq!(invalid.errors, vec!["probe failed".to_string()]);
    }

    #[tokio::test]
    async fn test_hanging_validation_times_out() {
        let invalid = validate(Probe { ok: true, hang: true }, Duration::from_millis(20))
            .await
            .err()
            .unwrap();
        assert!(invalid.errors[0].contains("did not complete"));
    }
}
