//! Priority-banded work queue.
//!
//! A [`CallQueue`] is the transport: opaque string payloads in numbered FIFO
//! bands, lower band numbers served first. [`CallBus`] layers the [`Call`]
//! codec on top so producers and the dispatcher deal in typed calls.

mod bus;
mod call;
mod in_memory;

use std::time::Duration;

use thiserror::Error;

pub use bus::CallBus;
pub use call::{Call, HandlerRef};
pub use in_memory::InMemoryCallQueue;

/// Number of priority bands.
pub const BAND_COUNT: u8 = 20;
/// Band for scheduled first attempts.
pub const FIRST_ATTEMPT_BAND: u8 = 0;
/// Band for retried calls.
pub const RETRY_BAND: u8 = 15;

/// All bands in precedence order.
pub fn all_bands() -> Vec<u8> {
    (0..BAND_COUNT).collect()
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("band {0} is out of range")]
    InvalidBand(u8),
    #[error("call cannot be encoded: {0}")]
    InvalidCall(String),
    #[error("undecodable call {raw:?}: {reason}")]
    Decode { raw: String, reason: String },
    #[error("queue lock poisoned")]
    LockPoisoned,
}

/// Transport contract for banded queues.
pub trait CallQueue: Send + Sync {
    /// Append a payload to the tail of `band`.
    fn enqueue(&self, band: u8, payload: String) -> Result<(), QueueError>;

    /// Block until any of `bands` holds an item, then pop the head of the
    /// first listed band that has data. Returns `None` once `timeout` elapses.
    fn dequeue_any(
        &self,
        bands: &[u8],
        timeout: Duration,
    ) -> Result<Option<(u8, String)>, QueueError>;

    /// Total number of pending payloads.
    fn len(&self) -> Result<usize, QueueError>;

    fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len()? == 0)
    }
}
