use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{HandlerError, HandlerRegistry};
use crate::queue::{Call, CallBus, QueueError, RETRY_BAND};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// What happened to the call popped by one dispatch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing arrived before the poll timeout.
    Idle,
    Completed { run_id: String },
    /// Temporary failure; pushed back into the retry band.
    Requeued { run_id: String, retry: u32 },
    /// Temporary failure past the retry ceiling; dropped.
    Exhausted { run_id: String, retry: u32 },
    /// Non-retryable failure; dropped.
    Failed { run_id: String, reason: String },
    /// Payload could not be decoded; dropped.
    Malformed { reason: String },
}

/// Serial call executor. One step pops one call and runs it to completion.
#[derive(Clone)]
pub struct Dispatcher {
    bus: CallBus,
    registry: Arc<HandlerRegistry>,
    max_retries: u32,
    poll_timeout: Duration,
}

impl Dispatcher {
    pub fn new(bus: CallBus, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            bus,
            registry,
            max_retries: DEFAULT_MAX_RETRIES,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Pop at most one call and execute it.
    ///
    /// Only transport failures are returned as errors; every handler outcome,
    /// including an undecodable payload, is reported as a [`DispatchOutcome`].
    pub fn dispatch_one(&self) -> Result<DispatchOutcome, QueueError> {
        match self.bus.pop(self.poll_timeout) {
            Ok(Some(call)) => self.execute(call),
            Ok(None) => Ok(DispatchOutcome::Idle),
            Err(QueueError::Decode { raw, reason }) => {
                error!(%raw, %reason, "dropping undecodable call");
                Ok(DispatchOutcome::Malformed { reason })
            }
            Err(e) => Err(e),
        }
    }

    /// Run one call through its handler and apply the retry rule.
    pub fn execute(&self, mut call: Call) -> Result<DispatchOutcome, QueueError> {
        let Some(handler) = self.registry.get(&call.handler) else {
            let reason = format!("no handler registered for {}", call.handler);
            error!(run_id = %call.run_id, %reason, "dropping call");
            return Ok(DispatchOutcome::Failed {
                run_id: call.run_id,
                reason,
            });
        };

        debug!(run_id = %call.run_id, handler = %call.handler, retry = call.retry, "executing call");

        match handler.call(&call.run_id, &call.options) {
            Ok(()) => {
                info!(run_id = %call.run_id, handler = %call.handler, "call completed");
                Ok(DispatchOutcome::Completed {
                    run_id: call.run_id,
                })
            }
            Err(HandlerError::Retry(reason)) => {
                call.retry += 1;
                if call.retry <= self.max_retries {
                    warn!(
                        run_id = %call.run_id,
                        handler = %call.handler,
                        retry = call.retry,
                        %reason,
                        "requeueing call"
                    );
                    self.bus.push(RETRY_BAND, &call)?;
                    Ok(DispatchOutcome::Requeued {
                        run_id: call.run_id,
                        retry: call.retry,
                    })
                } else {
                    warn!(
                        run_id = %call.run_id,
                        handler = %call.handler,
                        max_retries = self.max_retries,
                        %reason,
                        "retries exhausted, dropping call"
                    );
                    Ok(DispatchOutcome::Exhausted {
                        run_id: call.run_id,
                        retry: call.retry,
                    })
                }
            }
            Err(HandlerError::Permanent(reason)) => {
                error!(run_id = %call.run_id, handler = %call.handler, %reason, "call failed");
                Ok(DispatchOutcome::Failed {
                    run_id: call.run_id,
                    reason,
                })
            }
        }
    }
}
