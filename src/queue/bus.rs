use std::sync::Arc;
use std::time::Duration;

use super::{all_bands, Call, CallQueue, QueueError};

/// Typed view over a [`CallQueue`].
#[derive(Clone)]
pub struct CallBus {
    queue: Arc<dyn CallQueue>,
    bands: Vec<u8>,
}

impl CallBus {
    pub fn new(queue: Arc<dyn CallQueue>) -> Self {
        Self {
            queue,
            bands: all_bands(),
        }
    }

    /// Encode and enqueue a call.
    pub fn push(&self, band: u8, call: &Call) -> Result<(), QueueError> {
        self.queue.enqueue(band, call.encode()?)
    }

    /// Pop the next call across all bands.
    ///
    /// An undecodable payload is removed from the queue and surfaces as
    /// [`QueueError::Decode`].
    pub fn pop(&self, timeout: Duration) -> Result<Option<Call>, QueueError> {
        match self.queue.dequeue_any(&self.bands, timeout)? {
            Some((_, payload)) => Call::decode(&payload).map(Some),
            None => Ok(None),
        }
    }

    pub fn pending(&self) -> Result<usize, QueueError> {
        self.queue.len()
    }
}
