use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::task::{next_fire_after, plan_start, StartPlan, Task, TaskState};
use super::timers::TimerTable;
use super::SchedulerError;
use crate::dispatch::HandlerRegistry;
use crate::id::{generate_unique_id, ID_LENGTH};
use crate::queue::{Call, CallBus, HandlerRef, FIRST_ATTEMPT_BAND};
use crate::store::TaskStateStore;

/// Fires declared tasks onto the call queue.
///
/// Cheap to clone; clones share tasks, state and timers.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    tasks: Vec<Task>,
    by_name: HashMap<String, usize>,
    registry: Arc<HandlerRegistry>,
    bus: CallBus,
    state: Arc<dyn TaskStateStore>,
    timers: TimerTable,
    id_length: usize,
}

impl Scheduler {
    /// Validate the task table against the handler registry.
    pub fn new(
        tasks: Vec<Task>,
        registry: Arc<HandlerRegistry>,
        bus: CallBus,
        state: Arc<dyn TaskStateStore>,
    ) -> Result<Self, SchedulerError> {
        Self::with_id_length(tasks, registry, bus, state, ID_LENGTH)
    }

    pub fn with_id_length(
        tasks: Vec<Task>,
        registry: Arc<HandlerRegistry>,
        bus: CallBus,
        state: Arc<dyn TaskStateStore>,
        id_length: usize,
    ) -> Result<Self, SchedulerError> {
        let mut by_name = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if !registry.contains(&task.handler) {
                return Err(SchedulerError::UnknownHandler(task.handler.clone()));
            }
            if by_name.insert(task.name.clone(), i).is_some() {
                return Err(SchedulerError::DuplicateTask(task.name.clone()));
            }
        }

        Ok(Self {
            inner: Arc::new(Inner {
                tasks,
                by_name,
                registry,
                bus,
                state,
                timers: TimerTable::new(),
                id_length,
            }),
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.inner.tasks
    }

    fn task(&self, name: &str) -> Result<&Task, SchedulerError> {
        self.inner
            .by_name
            .get(name)
            .map(|&i| &self.inner.tasks[i])
            .ok_or_else(|| SchedulerError::UnknownTask(name.to_string()))
    }

    /// Fire a task now. Returns the new run id.
    pub fn schedule(&self, name: &str) -> Result<String, SchedulerError> {
        let task = self.task(name)?;
        let now = Utc::now();
        let state = TaskState {
            run_id: generate_unique_id(self.inner.id_length),
            next_fire: next_fire_after(now, task.repeat),
        };
        self.inner.state.set(&task.name, state.encode())?;

        let call = Call::new(state.run_id.clone(), task.handler.clone(), task.options.clone());
        self.inner.bus.push(FIRST_ATTEMPT_BAND, &call)?;
        info!(task = %task.name, run_id = %state.run_id, handler = %task.handler, "task fired");

        if let Some(period) = task.repeat {
            self.arm(name, period)?;
        }
        Ok(state.run_id)
    }

    /// Resume every recurring task from persisted state.
    ///
    /// One-shot tasks only run through an explicit [`schedule`](Self::schedule).
    pub fn start(&self) -> Result<(), SchedulerError> {
        let now = Utc::now();
        for task in self.inner.tasks.iter() {
            if !task.is_recurring() {
                continue;
            }
            let state = match self.inner.state.get(&task.name)? {
                Some(raw) => match TaskState::decode(&raw) {
                    Ok(state) => Some(state),
                    Err(e) => {
                        warn!(task = %task.name, error = %e, "ignoring unreadable task state");
                        None
                    }
                },
                None => None,
            };

            match plan_start(state.as_ref(), now) {
                StartPlan::FireNow => {
                    self.schedule(&task.name)?;
                }
                StartPlan::Arm(delay) => {
                    info!(task = %task.name, ?delay, "resuming task timer");
                    self.arm(&task.name, delay)?;
                }
            }
        }
        Ok(())
    }

    /// Enqueue ad hoc work for a registered handler. Returns the run id.
    pub fn submit(&self, handler: HandlerRef, options: Value) -> Result<String, SchedulerError> {
        if !self.inner.registry.contains(&handler) {
            return Err(SchedulerError::UnknownHandler(handler));
        }
        let call = Call::new(generate_unique_id(self.inner.id_length), handler, options);
        self.inner.bus.push(FIRST_ATTEMPT_BAND, &call)?;
        info!(run_id = %call.run_id, handler = %call.handler, "call submitted");
        Ok(call.run_id)
    }

    /// Current persisted state of a task.
    pub fn state(&self, name: &str) -> Result<Option<TaskState>, SchedulerError> {
        let task = self.task(name)?;
        self.inner
            .state
            .get(&task.name)?
            .map(|raw| TaskState::decode(&raw))
            .transpose()
    }

    /// Cancel all armed timers. Calls already queued are left alone.
    pub fn shutdown(&self) {
        self.inner.timers.shutdown();
        info!("scheduler stopped");
    }

    fn arm(&self, name: &str, delay: std::time::Duration) -> Result<(), SchedulerError> {
        let scheduler = self.clone();
        let task = name.to_string();
        self.inner.timers.arm(name, delay, move || {
            if let Err(e) = scheduler.schedule(&task) {
                warn!(task = %task, error = %e, "scheduled fire failed");
            }
        })
    }
}
