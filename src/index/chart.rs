//! Charts computed on demand from the primary collection.
//!
//! A chart index holds no state: `apply` and `clear` are no-ops and every
//! read aggregates the current primary data.

use chrono::Utc;

use crate::chart::{aggregate, Chart, ChartKind};
use crate::dao::{DaoConfig, IndexDriver, Record};
use crate::error::DaoError;
use crate::store::Filter;

/// What to aggregate for a chart key.
#[derive(Debug, Clone)]
pub struct ChartQuery {
    pub item_id: String,
    pub filter: Filter,
}

#[derive(Debug, Clone)]
pub enum ChartShape {
    /// Records per calendar month of `date_path`, from January of `start_year`.
    MonthlyVolume { date_path: String, start_year: i32 },
    /// Records per distinct `group_path`, most frequent first.
    Distribution { group_path: String },
    /// `value_path` over `date_path`, one series per combination of the
    /// values at `series_paths`.
    Series {
        series_paths: Vec<String>,
        date_path: String,
        value_path: String,
    },
}

type QueryFn = Box<dyn Fn(&str) -> Option<ChartQuery> + Send + Sync>;

pub struct ChartIndex {
    name: String,
    item_type: String,
    kind: ChartKind,
    shape: ChartShape,
    query: QueryFn,
}

impl ChartIndex {
    /// `query` maps a chart key to its subject and filter, or `None` if the
    /// key is malformed.
    pub fn new<F>(
        name: impl Into<String>,
        item_type: impl Into<String>,
        kind: ChartKind,
        shape: ChartShape,
        query: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<ChartQuery> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            item_type: item_type.into(),
            kind,
            shape,
            query: Box::new(query),
        }
    }
}

impl<T: Record> IndexDriver<T> for ChartIndex {
    fn name(&self) -> &str {
        &self.name
    }

    /// Charts are not record views.
    fn load(&self, _conf: &DaoConfig<T>, _keys: &[String]) -> Result<Vec<Option<T>>, DaoError> {
        Ok(Vec::new())
    }

    fn apply(&self, _conf: &DaoConfig<T>, _records: &[T]) -> Result<(), DaoError> {
        Ok(())
    }

    fn clear(&self, _conf: &DaoConfig<T>, _records: &[T]) -> Result<(), DaoError> {
        Ok(())
    }

    fn has_changed(&self, _old: &T, _new: &T) -> bool {
        false
    }

    fn chart(&self, conf: &DaoConfig<T>, key: &str) -> Result<Chart, DaoError> {
        let query = (self.query)(key).ok_or_else(|| DaoError::InvalidKey {
            index: self.name.clone(),
            key: key.to_string(),
        })?;
        let primary = conf.stores.primary.as_ref();

        let points = match &self.shape {
            ChartShape::MonthlyVolume {
                date_path,
                start_year,
            } => aggregate::month_volume(
                primary,
                &conf.collection,
                &query.filter,
                date_path,
                *start_year,
                Utc::now(),
            )?,
            ChartShape::Distribution { group_path } => {
                aggregate::distribution(primary, &conf.collection, &query.filter, group_path)?
            }
            ChartShape::Series {
                series_paths,
                date_path,
                value_path,
            } => {
                let data = aggregate::series(
                    primary,
                    &conf.collection,
                    &query.filter,
                    series_paths,
                    date_path,
                    value_path,
                )?;
                return Ok(Chart::new(query.item_id, self.item_type.clone(), self.kind, data));
            }
        };

        Ok(Chart::single(query.item_id, self.item_type.clone(), self.kind, points))
    }
}
