//! InMemoryPrimaryStore - map-backed document store for tests and single-process use.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::primary::{BucketCount, GroupCount, PrimaryStore};
use super::{path, Filter};
use crate::error::StoreError;

type Collection = BTreeMap<String, Value>;

/// In-memory document store.
///
/// Clone-friendly via `Arc`: every clone reads and writes the same collections.
#[derive(Clone, Default)]
pub struct InMemoryPrimaryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryPrimaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("primary count"))?;
        Ok(collections.get(collection).map(BTreeMap::len).unwrap_or(0))
    }

    fn matching<'a>(
        collection: Option<&'a Collection>,
        filter: &'a Filter,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        collection
            .into_iter()
            .flat_map(|docs| docs.iter())
            .filter(move |(_, doc)| filter.matches(doc))
    }
}

impl PrimaryStore for InMemoryPrimaryStore {
    fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Option<Value>>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("primary read"))?;
        let docs = collections.get(collection);
        Ok(ids
            .iter()
            .map(|id| docs.and_then(|d| d.get(id)).cloned())
            .collect())
    }

    fn put_many(&self, collection: &str, docs: Vec<(String, Value)>) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("primary write"))?;
        let target = collections.entry(collection.to_string()).or_default();
        for (id, doc) in docs {
            if !doc.is_object() {
                return Err(StoreError::NotAnObject {
                    collection: collection.to_string(),
                    id,
                });
            }
            target.insert(id, doc);
        }
        Ok(())
    }

    fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("primary delete"))?;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(0);
        };
        Ok(ids.iter().filter(|id| target.remove(*id).is_some()).count())
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Value)>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("primary find"))?;
        Ok(Self::matching(collections.get(collection), filter)
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }

    fn bucket_count(
        &self,
        collection: &str,
        filter: &Filter,
        group_by: &str,
        boundaries: &[String],
        default: &str,
    ) -> Result<Vec<BucketCount>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("primary bucket"))?;

        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for (_, doc) in Self::matching(collections.get(collection), filter) {
            let bucket = path::lookup_first(doc, group_by)
                .and_then(Value::as_str)
                .and_then(|value| bucket_for(value, boundaries))
                .unwrap_or(default);
            *counts.entry(bucket.to_string()).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(id, count)| BucketCount { id, count })
            .collect())
    }

    fn group_count(
        &self,
        collection: &str,
        filter: &Filter,
        group_by: &str,
    ) -> Result<Vec<GroupCount>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("primary group"))?;

        // Keyed by the serialized value so distinct JSON values stay distinct.
        let mut counts: BTreeMap<String, GroupCount> = BTreeMap::new();
        for (_, doc) in Self::matching(collections.get(collection), filter) {
            let key = path::lookup_first(doc, group_by)
                .cloned()
                .unwrap_or(Value::Null);
            counts
                .entry(key.to_string())
                .or_insert_with(|| GroupCount { key, count: 0 })
                .count += 1;
        }

        let mut groups: Vec<GroupCount> = counts.into_values().collect();
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(groups)
    }
}

fn bucket_for<'a>(value: &str, boundaries: &'a [String]) -> Option<&'a str> {
    boundaries
        .windows(2)
        .find(|w| w[0].as_str() <= value && value < w[1].as_str())
        .map(|w| w[0].as_str())
}
