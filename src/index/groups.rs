//! Group membership lookups for partitioned feeds.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::dao::{DaoConfig, Record};
use crate::error::DaoError;
use crate::store::path;

/// Groups a record belongs to, or the parent that could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Groups(Vec<String>),
    MissingParent { entity: String, id: String },
}

/// Resolves group memberships for a whole batch in one lookup.
pub trait GroupResolver<T: Record>: Send + Sync {
    /// One membership per record, in input order.
    fn resolve(&self, conf: &DaoConfig<T>, records: &[T]) -> Result<Vec<Membership>, DaoError>;
}

/// Groups taken from a parent document referenced by foreign key.
///
/// For runs: `run.game.id` points into `games`, whose `genres.id` values are
/// the groups.
#[derive(Debug, Clone)]
pub struct ForeignKeyGroups {
    pub foreign_key_path: String,
    pub parent_collection: String,
    pub group_path: String,
}

impl ForeignKeyGroups {
    pub fn new(
        foreign_key_path: impl Into<String>,
        parent_collection: impl Into<String>,
        group_path: impl Into<String>,
    ) -> Self {
        Self {
            foreign_key_path: foreign_key_path.into(),
            parent_collection: parent_collection.into(),
            group_path: group_path.into(),
        }
    }

    fn foreign_key(&self, doc: &Value) -> Option<String> {
        path::lookup_first(doc, &self.foreign_key_path).and_then(path::scalar_key)
    }
}

impl<T: Record> GroupResolver<T> for ForeignKeyGroups {
    fn resolve(&self, conf: &DaoConfig<T>, records: &[T]) -> Result<Vec<Membership>, DaoError> {
        let keys = records
            .iter()
            .map(|r| Ok(self.foreign_key(&serde_json::to_value(r)?)))
            .collect::<Result<Vec<Option<String>>, DaoError>>()?;

        let wanted: Vec<String> = keys
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let parents: HashMap<String, Value> = if wanted.is_empty() {
            HashMap::new()
        } else {
            wanted
                .iter()
                .cloned()
                .zip(conf.stores.primary.get_many(&self.parent_collection, &wanted)?)
                .filter_map(|(id, doc)| Some((id, doc?)))
                .collect()
        };

        Ok(keys
            .into_iter()
            .map(|key| {
                let key = key.unwrap_or_default();
                match parents.get(&key) {
                    Some(parent) => {
                        let groups: BTreeSet<String> = path::lookup(parent, &self.group_path)
                            .into_iter()
                            .filter_map(path::scalar_key)
                            .collect();
                        Membership::Groups(groups.into_iter().collect())
                    }
                    None => Membership::MissingParent {
                        entity: self.parent_collection.clone(),
                        id: key,
                    },
                }
            })
            .collect())
    }
}
