pub mod chart;
pub mod config;
pub mod dao;
pub mod dispatch;
mod error;
pub mod id;
pub mod index;
pub mod queue;
pub mod runs;
pub mod scheduler;
pub mod scraper;
pub mod store;
pub mod telemetry;

pub use chart::{Chart, ChartKind, ChartPoint, ChartX};
pub use config::{Config, ConfigError, FeedConfig, ScraperConfig};
pub use dao::{id_fn, Dao, DaoConfig, IdFn, IndexDriver, Record};
pub use dispatch::{
    DispatchOutcome, DispatchStats, Dispatcher, DispatcherThread, Handler, HandlerError,
    HandlerRegistry, RegistryError,
};
pub use error::{DaoError, StoreError};
pub use id::{generate_unique_id, join_run_id};
pub use index::{ChartIndex, ChartQuery, ChartShape, ForeignKeyGroups, GroupResolver, RecencyIndex};
pub use queue::{Call, CallBus, CallQueue, HandlerRef, InMemoryCallQueue, QueueError};
pub use runs::{GameDao, LeaderboardRunEntry, Run, RunDao};
pub use scheduler::{Scheduler, SchedulerError, Task, TaskState};
pub use scraper::{base_tasks, Scraper, ScraperHandle};
pub use store::Stores;
