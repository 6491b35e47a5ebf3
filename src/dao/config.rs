use std::marker::PhantomData;

use super::{IdFn, Record};
use crate::error::DaoError;
use crate::store::Stores;

/// What an index driver gets from its owning Dao.
///
/// Built once per Dao and lent to every driver by reference.
pub struct DaoConfig<T> {
    pub collection: String,
    pub stores: Stores,
    id_fn: IdFn<T>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> DaoConfig<T> {
    pub fn new(collection: impl Into<String>, stores: Stores, id_fn: IdFn<T>) -> Self {
        Self {
            collection: collection.into(),
            stores,
            id_fn,
            _record: PhantomData,
        }
    }

    pub fn id_of(&self, record: &T) -> String {
        (self.id_fn)(record)
    }

    /// Bulk load by id, preserving order. Missing ids yield `None`.
    pub fn load(&self, ids: &[String]) -> Result<Vec<Option<T>>, DaoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.stores
            .primary
            .get_many(&self.collection, ids)?
            .into_iter()
            .map(|doc| doc.map(serde_json::from_value).transpose().map_err(DaoError::from))
            .collect()
    }
}
