use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::{DaoConfig, IdFn, IndexDriver, Record};
use crate::chart::Chart;
use crate::error::DaoError;
use crate::store::{Filter, Stores};

type Transform<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Persistence manager for one collection of `T`.
pub struct Dao<T: Record> {
    conf: DaoConfig<T>,
    indexes: Vec<Box<dyn IndexDriver<T>>>,
    transform: Option<Transform<T>>,
}

impl<T: Record> Dao<T> {
    pub fn new(collection: impl Into<String>, stores: Stores, id_fn: IdFn<T>) -> Self {
        Self {
            conf: DaoConfig::new(collection, stores, id_fn),
            indexes: Vec::new(),
            transform: None,
        }
    }

    /// Attach an index driver. Drivers run in attachment order.
    pub fn with_index<D>(mut self, driver: D) -> Self
    where
        D: IndexDriver<T> + 'static,
    {
        self.indexes.push(Box::new(driver));
        self
    }

    /// Normalize records before they are written.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn config(&self) -> &DaoConfig<T> {
        &self.conf
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.indexes.iter().map(|d| d.name()).collect()
    }

    fn index(&self, name: &str) -> Result<&dyn IndexDriver<T>, DaoError> {
        self.indexes
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.as_ref())
            .ok_or_else(|| DaoError::UnknownIndex(name.to_string()))
    }

    /// Write a batch of records, then update every index they affect.
    ///
    /// Within a batch, the last record with a given id wins. Index failures
    /// are returned after the primary write has already committed.
    pub fn store(&self, records: Vec<T>) -> Result<(), DaoError> {
        if records.is_empty() {
            return Ok(());
        }

        let records: Vec<T> = match &self.transform {
            Some(transform) => records.into_iter().map(transform).collect(),
            None => records,
        };
        let records = dedupe_last(records, |r| self.conf.id_of(r));
        let ids: Vec<String> = records.iter().map(|(id, _)| id.clone()).collect();

        let old = self.conf.load(&ids)?;

        let docs = records
            .iter()
            .map(|(id, record)| Ok((id.clone(), serde_json::to_value(record)?)))
            .collect::<Result<Vec<_>, DaoError>>()?;
        self.conf.stores.primary.put_many(&self.conf.collection, docs)?;
        debug!(collection = %self.conf.collection, count = ids.len(), "records stored");

        for driver in &self.indexes {
            let changed: Vec<T> = records
                .iter()
                .zip(&old)
                .filter(|((_, new), old)| match old {
                    Some(old) => driver.has_changed(old, new),
                    None => true,
                })
                .map(|((_, new), _)| new.clone())
                .collect();
            if changed.is_empty() {
                continue;
            }
            driver
                .apply(&self.conf, &changed)
                .map_err(|e| index_error(driver.name(), e))?;
        }
        Ok(())
    }

    pub fn save(&self, record: T) -> Result<(), DaoError> {
        self.store(vec![record])
    }

    /// Load by id, preserving order. Missing ids yield `None`.
    pub fn load(&self, ids: &[String]) -> Result<Vec<Option<T>>, DaoError> {
        self.conf.load(ids)
    }

    pub fn load_one(&self, id: &str) -> Result<Option<T>, DaoError> {
        Ok(self.conf.load(&[id.to_string()])?.into_iter().next().flatten())
    }

    /// Delete records and clear them from every index. Returns how many existed.
    pub fn remove(&self, ids: &[String]) -> Result<usize, DaoError> {
        let existing: Vec<T> = self.conf.load(ids)?.into_iter().flatten().collect();
        let removed = self.conf.stores.primary.delete_many(&self.conf.collection, ids)?;

        if !existing.is_empty() {
            for driver in &self.indexes {
                driver
                    .clear(&self.conf, &existing)
                    .map_err(|e| index_error(driver.name(), e))?;
            }
        }
        debug!(collection = %self.conf.collection, removed, "records removed");
        Ok(removed)
    }

    /// Read through a named index.
    pub fn load_by_index(&self, name: &str, key: &str) -> Result<Vec<Option<T>>, DaoError> {
        self.index(name)?.load(&self.conf, &[key.to_string()])
    }

    /// Compute a chart from a named chart index.
    pub fn load_chart(&self, name: &str, key: &str) -> Result<Chart, DaoError> {
        self.index(name)?.chart(&self.conf, key)
    }

    /// Re-apply every stored record through one index. Returns how many were applied.
    pub fn rebuild_index(&self, name: &str) -> Result<usize, DaoError> {
        let driver = self.index(name)?;
        let records = self
            .conf
            .stores
            .primary
            .find(&self.conf.collection, &Filter::new())?
            .into_iter()
            .map(|(_, doc)| serde_json::from_value(doc))
            .collect::<Result<Vec<T>, _>>()?;

        if !records.is_empty() {
            driver
                .apply(&self.conf, &records)
                .map_err(|e| index_error(name, e))?;
        }
        info!(collection = %self.conf.collection, index = name, count = records.len(), "index rebuilt");
        Ok(records.len())
    }
}

fn index_error(index: &str, source: DaoError) -> DaoError {
    DaoError::Index {
        index: index.to_string(),
        source: Box::new(source),
    }
}

fn dedupe_last<T>(records: Vec<T>, id_of: impl Fn(&T) -> String) -> Vec<(String, T)> {
    let mut slot: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<(String, T)> = Vec::with_capacity(records.len());
    for record in records {
        let id = id_of(&record);
        match slot.get(&id) {
            Some(&i) => out[i].1 = record,
            None => {
                slot.insert(id.clone(), out.len());
                out.push((id, record));
            }
        }
    }
    out
}

/// Build an [`IdFn`] from a closure.
pub fn id_fn<T, F>(f: F) -> IdFn<T>
where
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}
