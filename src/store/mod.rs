//! Backing stores and the context that carries them.
//!
//! Three kinds of external storage sit behind traits so deployments can swap
//! implementations without touching the scheduler or the Dao:
//!
//! - [`PrimaryStore`] - document collections, the only source of truth
//! - [`OrderedStore`] - score-ordered sets that hold derived feed views
//! - [`TaskStateStore`] - the hash of live scheduler state
//!
//! The in-memory implementations are shared through `Arc` and are what the
//! test-suite and single-process setups use.

mod filter;
mod in_memory_ordered;
mod in_memory_primary;
mod ordered;
pub mod path;
mod primary;
mod task_state;

use std::sync::Arc;

pub use filter::{Condition, Filter};
pub use in_memory_ordered::InMemoryOrderedStore;
pub use in_memory_primary::InMemoryPrimaryStore;
pub use ordered::{OrderedOp, OrderedStore};
pub use primary::{BucketCount, GroupCount, PrimaryStore};
pub use task_state::{InMemoryTaskStateStore, TaskStateStore};

/// Handles to the shared backing stores.
///
/// Built once at startup and handed by reference (or cheap clone) to every
/// Dao; there are no process-global connections.
#[derive(Clone)]
pub struct Stores {
    pub primary: Arc<dyn PrimaryStore>,
    pub ordered: Arc<dyn OrderedStore>,
}

impl Stores {
    pub fn new(primary: Arc<dyn PrimaryStore>, ordered: Arc<dyn OrderedStore>) -> Self {
        Self { primary, ordered }
    }

    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryPrimaryStore::new()),
            Arc::new(InMemoryOrderedStore::new()),
        )
    }
}
