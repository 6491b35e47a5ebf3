//! In-memory banded queue for tests and single-process deployments.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use super::{CallQueue, QueueError, BAND_COUNT};

/// Thread-safe banded queue. Clones share the same bands.
#[derive(Clone)]
pub struct InMemoryCallQueue {
    inner: Arc<Shared>,
}

struct Shared {
    bands: Mutex<Vec<VecDeque<String>>>,
    ready: Condvar,
}

impl Default for InMemoryCallQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCallQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                bands: Mutex::new(vec![VecDeque::new(); BAND_COUNT as usize]),
                ready: Condvar::new(),
            }),
        }
    }

    /// Snapshot of the payloads pending in one band.
    pub fn pending(&self, band: u8) -> Result<Vec<String>, QueueError> {
        let bands = self.inner.bands.lock().map_err(|_| QueueError::LockPoisoned)?;
        bands
            .get(band as usize)
            .map(|q| q.iter().cloned().collect())
            .ok_or(QueueError::InvalidBand(band))
    }
}

fn pop_first(bands: &mut [VecDeque<String>], wanted: &[u8]) -> Option<(u8, String)> {
    wanted.iter().find_map(|&band| {
        bands
            .get_mut(band as usize)
            .and_then(VecDeque::pop_front)
            .map(|payload| (band, payload))
    })
}

impl CallQueue for InMemoryCallQueue {
    fn enqueue(&self, band: u8, payload: String) -> Result<(), QueueError> {
        if band >= BAND_COUNT {
            return Err(QueueError::InvalidBand(band));
        }
        let mut bands = self.inner.bands.lock().map_err(|_| QueueError::LockPoisoned)?;
        bands[band as usize].push_back(payload);
        self.inner.ready.notify_all();
        Ok(())
    }

    fn dequeue_any(
        &self,
        wanted: &[u8],
        timeout: Duration,
    ) -> Result<Option<(u8, String)>, QueueError> {
        if let Some(&band) = wanted.iter().find(|&&b| b >= BAND_COUNT) {
            return Err(QueueError::InvalidBand(band));
        }

        let deadline = Instant::now() + timeout;
        let mut bands = self.inner.bands.lock().map_err(|_| QueueError::LockPoisoned)?;
        loop {
            if let Some(hit) = pop_first(&mut bands, wanted) {
                return Ok(Some(hit));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let (guard, _) = self
                .inner
                .ready
                .wait_timeout(bands, deadline - now)
                .map_err(|_| QueueError::LockPoisoned)?;
            bands = guard;
        }
    }

    fn len(&self) -> Result<usize, QueueError> {
        let bands = self.inner.bands.lock().map_err(|_| QueueError::LockPoisoned)?;
        Ok(bands.iter().map(VecDeque::len).sum())
    }
}
