//! TaskStateStore - the external hash holding each task's live state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::StoreError;

/// A string hash keyed by task name.
///
/// Values are opaque here; the scheduler owns their encoding.
pub trait TaskStateStore: Send + Sync {
    fn get(&self, task: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, task: &str, value: String) -> Result<(), StoreError>;
}

/// In-memory task state hash. Clone-friendly via `Arc`.
#[derive(Clone, Default)]
pub struct InMemoryTaskStateStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryTaskStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStateStore for InMemoryTaskStateStore {
    fn get(&self, task: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned("task state read"))?;
        Ok(entries.get(task).cloned())
    }

    fn set(&self, task: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned("task state write"))?;
        entries.insert(task.to_string(), value);
        Ok(())
    }
}
