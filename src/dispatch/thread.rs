//! Background thread running the dispatch loop.

use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info};

use super::{DispatchOutcome, Dispatcher};

/// Counters collected by the dispatch loop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchStats {
    pub polls: usize,
    pub completed: usize,
    pub requeued: usize,
    pub exhausted: usize,
    pub failed: usize,
    pub malformed: usize,
    pub transport_errors: usize,
}

impl DispatchStats {
    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Idle => {}
            DispatchOutcome::Completed { .. } => self.completed += 1,
            DispatchOutcome::Requeued { .. } => self.requeued += 1,
            DispatchOutcome::Exhausted { .. } => self.exhausted += 1,
            DispatchOutcome::Failed { .. } => self.failed += 1,
            DispatchOutcome::Malformed { .. } => self.malformed += 1,
        }
    }
}

/// Spacing between dequeue attempts for a calls-per-second ceiling.
pub fn pacing_interval(rate: f64) -> Duration {
    if rate.is_finite() && rate > 0.0 {
        Duration::from_secs_f64(1.0 / rate)
    } else {
        Duration::ZERO
    }
}

/// A thread that pops and executes calls one at a time until stopped.
///
/// ```ignore
/// let worker = DispatcherThread::spawn(dispatcher, 2.0);
/// // ... enqueue work ...
/// let stats = worker.stop();
/// println!("completed {} calls", stats.completed);
/// ```
pub struct DispatcherThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<DispatchStats>>,
}

impl DispatcherThread {
    /// Start dispatching at no more than `rate` calls per second.
    pub fn spawn(dispatcher: Dispatcher, rate: f64) -> Self {
        let (stop_tx, stop_rx) = channel();
        let interval = pacing_interval(rate);

        let handle = thread::spawn(move || {
            let mut stats = DispatchStats::default();
            info!(rate, "dispatcher started");

            loop {
                let started = Instant::now();
                stats.polls += 1;

                match dispatcher.dispatch_one() {
                    Ok(outcome) => stats.record(&outcome),
                    Err(e) => {
                        stats.transport_errors += 1;
                        error!(error = %e, "dequeue failed");
                    }
                }

                // Sleeping on the stop channel keeps shutdown prompt.
                let wait = interval.saturating_sub(started.elapsed());
                match stop_rx.recv_timeout(wait) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }

            info!(completed = stats.completed, polls = stats.polls, "dispatcher stopped");
            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the loop to stop, wait for the in-flight call, and return stats.
    pub fn stop(mut self) -> DispatchStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => DispatchStats::default(),
        }
    }

    /// Signal the loop to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

/// Dropping signals the loop to stop but does not join it; use
/// [`DispatcherThread::stop`] to wait for the in-flight call.
impl Drop for DispatcherThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
