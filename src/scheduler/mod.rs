//! Task scheduling.
//!
//! Tasks are declared statically. Firing a task records a fresh run id and its
//! next fire time in the [`TaskStateStore`](crate::store::TaskStateStore),
//! enqueues a first-attempt call, and (for recurring tasks) arms the next
//! timer. On startup, persisted state decides whether a task fires at once or
//! waits out the rest of its period.

mod schedule;
mod task;
mod timers;

use thiserror::Error;

use crate::error::StoreError;
use crate::queue::{HandlerRef, QueueError};

pub use schedule::Scheduler;
pub use task::{next_fire_after, plan_start, StartPlan, Task, TaskState};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("task {0:?} is declared twice")]
    DuplicateTask(String),
    #[error("unknown task {0:?}")]
    UnknownTask(String),
    #[error("no handler registered for {0}")]
    UnknownHandler(HandlerRef),
    #[error("malformed task state {0:?}")]
    BadState(String),
    #[error("could not spawn timer: {0}")]
    Timer(#[source] std::io::Error),
    #[error("timer table lock poisoned")]
    LockPoisoned,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}
