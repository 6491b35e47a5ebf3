//! Wiring for a scraping process: the static task table, a scheduler and one
//! dispatcher thread over a shared queue.
//!
//! Loaders are supplied by the application through [`Scraper::register`].
//! Every task's handler must be registered before [`Scraper::start`].

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ScraperConfig;
use crate::dispatch::{
    DispatchStats, Dispatcher, DispatcherThread, Handler, HandlerRegistry, RegistryError,
};
use crate::queue::{CallBus, CallQueue, HandlerRef};
use crate::scheduler::{Scheduler, SchedulerError, Task};
use crate::store::TaskStateStore;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Tasks every scraper runs.
pub fn base_tasks() -> Vec<Task> {
    vec![Task::every(
        "load_gamelist",
        HandlerRef::new("gamelist", "list_all_games"),
        DAY,
    )]
}

pub struct Scraper {
    config: ScraperConfig,
    queue: Arc<dyn CallQueue>,
    state: Arc<dyn TaskStateStore>,
    registry: HandlerRegistry,
    tasks: Vec<Task>,
}

impl Scraper {
    /// A scraper running [`base_tasks`].
    pub fn new(
        config: ScraperConfig,
        queue: Arc<dyn CallQueue>,
        state: Arc<dyn TaskStateStore>,
    ) -> Self {
        Self {
            config,
            queue,
            state,
            registry: HandlerRegistry::new(),
            tasks: base_tasks(),
        }
    }

    /// Replace the task table.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn register<H>(
        &mut self,
        module: impl Into<String>,
        exec: impl Into<String>,
        handler: H,
    ) -> Result<&mut Self, RegistryError>
    where
        H: Handler + 'static,
    {
        self.registry.register(module, exec, handler)?;
        Ok(self)
    }

    /// Spawn the dispatcher and resume every recurring task.
    pub fn start(self) -> Result<ScraperHandle, SchedulerError> {
        let registry = Arc::new(self.registry);
        let bus = CallBus::new(self.queue);

        let scheduler = Scheduler::with_id_length(
            self.tasks,
            Arc::clone(&registry),
            bus.clone(),
            self.state,
            self.config.id_length,
        )?;

        let dispatcher = Dispatcher::new(bus, registry)
            .with_max_retries(self.config.max_retries)
            .with_poll_timeout(self.config.poll_timeout);
        let worker = DispatcherThread::spawn(dispatcher, self.config.rate);

        if let Err(e) = scheduler.start() {
            scheduler.shutdown();
            worker.stop();
            return Err(e);
        }
        info!(tasks = scheduler.tasks().len(), rate = self.config.rate, "scraper started");

        Ok(ScraperHandle { scheduler, worker })
    }
}

/// A running scraper.
pub struct ScraperHandle {
    scheduler: Scheduler,
    worker: DispatcherThread,
}

impl ScraperHandle {
    /// For ad hoc submissions and inspecting task state.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Cancel timers, finish the in-flight call, and stop dispatching.
    pub fn stop(self) -> DispatchStats {
        self.scheduler.shutdown();
        let stats = self.worker.stop();
        info!(completed = stats.completed, "scraper stopped");
        stats
    }
}
