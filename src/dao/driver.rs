use super::{DaoConfig, Record};
use crate::chart::Chart;
use crate::error::DaoError;

/// A derived view maintained alongside a Dao's primary collection.
///
/// Every view must be reproducible by replaying `apply` and `clear` in write
/// order; the primary collection never depends on it.
pub trait IndexDriver<T: Record>: Send + Sync {
    fn name(&self) -> &str;

    /// Read records through the index.
    fn load(&self, conf: &DaoConfig<T>, keys: &[String]) -> Result<Vec<Option<T>>, DaoError>;

    /// Fold newly written records into the view.
    fn apply(&self, conf: &DaoConfig<T>, records: &[T]) -> Result<(), DaoError>;

    /// Drop deleted records from the view.
    fn clear(&self, conf: &DaoConfig<T>, records: &[T]) -> Result<(), DaoError>;

    /// Whether a rewrite from `old` to `new` affects this view.
    fn has_changed(&self, old: &T, new: &T) -> bool;

    /// Compute a chart for `key`. Only chart drivers support this.
    fn chart(&self, _conf: &DaoConfig<T>, _key: &str) -> Result<Chart, DaoError> {
        Err(DaoError::NotAChart(self.name().to_string()))
    }
}
