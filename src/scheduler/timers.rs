//! Per-task timers where arming supersedes instead of stacking.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::SchedulerError;

#[derive(Default)]
struct Table {
    generations: HashMap<String, u64>,
    shut_down: bool,
}

/// Each task name has a generation counter. Arming bumps it and wakes every
/// waiting timer; a timer only fires if its generation is still current.
#[derive(Clone, Default)]
pub(crate) struct TimerTable {
    inner: Arc<(Mutex<Table>, Condvar)>,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer for `name`, superseding any armed one.
    pub fn arm<F>(&self, name: &str, delay: Duration, fire: F) -> Result<(), SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let (lock, wake) = &*self.inner;
        let generation = {
            let mut table = lock.lock().map_err(|_| SchedulerError::LockPoisoned)?;
            if table.shut_down {
                return Ok(());
            }
            let generation = table.generations.entry(name.to_string()).or_insert(0);
            *generation += 1;
            *generation
        };
        wake.notify_all();

        let inner = Arc::clone(&self.inner);
        let task = name.to_string();
        debug!(task = %task, ?delay, generation, "timer armed");

        thread::Builder::new()
            .name(format!("timer-{task}"))
            .spawn(move || {
                if wait(&inner, &task, generation, delay) {
                    fire();
                }
            })
            .map_err(SchedulerError::Timer)?;
        Ok(())
    }

    /// Cancel every armed timer and refuse new ones.
    pub fn shutdown(&self) {
        let (lock, wake) = &*self.inner;
        if let Ok(mut table) = lock.lock() {
            table.shut_down = true;
        }
        wake.notify_all();
    }
}

/// Sleep until the deadline. False when superseded or shut down first.
fn wait(inner: &(Mutex<Table>, Condvar), task: &str, generation: u64, delay: Duration) -> bool {
    let (lock, wake) = inner;
    let deadline = Instant::now() + delay;
    let Ok(mut table) = lock.lock() else {
        return false;
    };
    loop {
        if table.shut_down || table.generations.get(task) != Some(&generation) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        table = match wake.wait_timeout(table, deadline - now) {
            Ok((guard, _)) => guard,
            Err(_) => return false,
        };
    }
}
