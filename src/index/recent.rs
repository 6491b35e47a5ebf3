//! Bounded recency feeds kept in ordered sets.
//!
//! Each feed is an ordered set of record ids scored by a date field. The
//! ungrouped set lives at `key`; grouped feeds live at `key:<group>`. Every
//! write trims the touched sets back to `keep_count` highest-scored entries.
//! Records whose metric is at or below [`DUMMY_EPSILON`] are placeholders and
//! are removed instead of added.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use super::{GroupResolver, Membership};
use crate::chart::aggregate;
use crate::dao::{DaoConfig, IndexDriver, Record};
use crate::error::DaoError;
use crate::store::{path, OrderedOp};

pub const DUMMY_EPSILON: f64 = 0.01;

pub struct RecencyIndex<T: Record> {
    name: String,
    date_path: String,
    metric_path: String,
    key: String,
    keep_count: usize,
    max_return: usize,
    epsilon: f64,
    groups: Option<Box<dyn GroupResolver<T>>>,
}

impl<T: Record> RecencyIndex<T> {
    pub fn new(
        name: impl Into<String>,
        date_path: impl Into<String>,
        metric_path: impl Into<String>,
        key: impl Into<String>,
        keep_count: usize,
        max_return: usize,
    ) -> Self {
        Self {
            name: name.into(),
            date_path: date_path.into(),
            metric_path: metric_path.into(),
            key: key.into(),
            keep_count,
            max_return,
            epsilon: DUMMY_EPSILON,
            groups: None,
        }
    }

    /// Also maintain one feed per group the resolver reports.
    pub fn grouped_by<G>(mut self, resolver: G) -> Self
    where
        G: GroupResolver<T> + 'static,
    {
        self.groups = Some(Box::new(resolver));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ordered-set key for a group; the empty group is the ungrouped feed.
    pub fn group_key(&self, group: &str) -> String {
        if group.is_empty() {
            self.key.clone()
        } else {
            format!("{}:{}", self.key, group)
        }
    }

    fn is_dummy(&self, doc: &Value) -> bool {
        path::lookup_first(doc, &self.metric_path)
            .and_then(Value::as_f64)
            .is_some_and(|metric| metric <= self.epsilon)
    }

    fn score(&self, doc: &Value) -> f64 {
        path::lookup_first(doc, &self.date_path)
            .map(date_score)
            .unwrap_or(0.0)
    }

    fn parse_key<'k>(&self, key: &'k str) -> Result<(&'k str, usize), DaoError> {
        let (group, offset) = key.rsplit_once(':').unwrap_or((key, ""));
        let offset = if offset.is_empty() {
            0
        } else {
            offset.parse().map_err(|_| DaoError::InvalidKey {
                index: self.name.clone(),
                key: key.to_string(),
            })?
        };
        Ok((group, offset))
    }
}

/// Unix seconds for a date value; 0 when it cannot be read.
fn date_score(value: &Value) -> f64 {
    if let Some(n) = value.as_f64() {
        return n;
    }
    value
        .as_str()
        .and_then(aggregate::date_seconds)
        .map(|t| t as f64)
        .unwrap_or(0.0)
}

impl<T: Record> IndexDriver<T> for RecencyIndex<T> {
    fn name(&self) -> &str {
        &self.name
    }

    /// `key` is `<group>:<offset>`; an empty group reads the ungrouped feed.
    fn load(&self, conf: &DaoConfig<T>, keys: &[String]) -> Result<Vec<Option<T>>, DaoError> {
        let [key] = keys else {
            return Err(DaoError::UnsupportedBatchRead(self.name.clone()));
        };
        let (group, offset) = self.parse_key(key)?;
        if self.max_return == 0 {
            return Ok(Vec::new());
        }

        // An offset this far out can only be past the end of the feed.
        let Some(stop) = offset.checked_add(self.max_return - 1) else {
            return Ok(Vec::new());
        };

        let ids = conf
            .stores
            .ordered
            .rev_range(&self.group_key(group), offset, stop)?;
        conf.load(&ids)
    }

    fn apply(&self, conf: &DaoConfig<T>, records: &[T]) -> Result<(), DaoError> {
        let docs = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        let memberships = match &self.groups {
            Some(resolver) => resolver.resolve(conf, records)?,
            None => vec![Membership::Groups(Vec::new()); records.len()],
        };

        // Refuse the whole batch before writing anything.
        for ((record, doc), membership) in records.iter().zip(&docs).zip(&memberships) {
            if let Membership::MissingParent { entity, id } = membership {
                if !self.is_dummy(doc) {
                    return Err(DaoError::MissingDependency {
                        record: conf.id_of(record),
                        entity: entity.clone(),
                        id: id.clone(),
                    });
                }
            }
        }

        let mut ops = Vec::new();
        let mut touched = BTreeSet::new();
        for ((record, doc), membership) in records.iter().zip(&docs).zip(&memberships) {
            let id = conf.id_of(record);
            let mut keys = vec![self.key.clone()];
            if let Membership::Groups(groups) = membership {
                keys.extend(groups.iter().map(|g| self.group_key(g)));
            }

            if self.is_dummy(doc) {
                debug!(index = %self.name, %id, "removing placeholder record from feed");
                ops.extend(keys.into_iter().map(|key| OrderedOp::Remove {
                    key,
                    members: vec![id.clone()],
                }));
                continue;
            }

            let score = self.score(doc);
            for key in keys {
                ops.push(OrderedOp::Add {
                    key: key.clone(),
                    member: id.clone(),
                    score,
                });
                touched.insert(key);
            }
        }

        let keep = isize::try_from(self.keep_count).unwrap_or(isize::MAX);
        ops.extend(touched.into_iter().map(|key| OrderedOp::RemoveRankRange {
            key,
            start: 0,
            stop: -keep - 1,
        }));

        conf.stores.ordered.exec(ops)?;
        Ok(())
    }

    fn clear(&self, conf: &DaoConfig<T>, records: &[T]) -> Result<(), DaoError> {
        let ids: Vec<String> = records.iter().map(|r| conf.id_of(r)).collect();
        conf.stores.ordered.remove(&self.key, &ids)?;
        Ok(())
    }

    fn has_changed(&self, old: &T, new: &T) -> bool {
        match (serde_json::to_value(old), serde_json::to_value(new)) {
            (Ok(old), Ok(new)) => {
                path::lookup_first(&old, &self.date_path) != path::lookup_first(&new, &self.date_path)
            }
            _ => true,
        }
    }
}
