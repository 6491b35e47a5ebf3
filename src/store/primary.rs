//! PrimaryStore - the document collections that are the source of truth.

use serde_json::Value;

use super::Filter;
use crate::error::StoreError;

/// One bucket produced by [`PrimaryStore::bucket_count`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketCount {
    /// Lower boundary of the bucket, or the default bucket id.
    pub id: String,
    pub count: u64,
}

/// One group produced by [`PrimaryStore::group_count`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    pub key: Value,
    pub count: u64,
}

/// Document collections keyed by identifier.
///
/// Documents are JSON values. Index structures never live here; everything in
/// a primary collection is authoritative and indexes are rebuilt from it.
pub trait PrimaryStore: Send + Sync {
    /// Fetch documents by id, preserving order. Missing ids yield `None`.
    fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Option<Value>>, StoreError>;

    /// Insert or replace documents.
    fn put_many(&self, collection: &str, docs: Vec<(String, Value)>) -> Result<(), StoreError>;

    /// Delete documents by id. Returns how many existed.
    fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize, StoreError>;

    /// All documents matching the filter, ordered by id.
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Value)>, StoreError>;

    /// Count matching documents per boundary bucket.
    ///
    /// `boundaries` must be sorted ascending; bucket `i` holds values `v` with
    /// `boundaries[i] <= v < boundaries[i + 1]` (string comparison). Values
    /// outside every bucket, or missing, are counted under `default`. Empty
    /// buckets are omitted. Output is ordered by bucket id.
    fn bucket_count(
        &self,
        collection: &str,
        filter: &Filter,
        group_by: &str,
        boundaries: &[String],
        default: &str,
    ) -> Result<Vec<BucketCount>, StoreError>;

    /// Count matching documents per distinct value of `group_by`, most
    /// frequent first. Documents without the field are grouped under `null`.
    fn group_count(
        &self,
        collection: &str,
        filter: &Filter,
        group_by: &str,
    ) -> Result<Vec<GroupCount>, StoreError>;
}
