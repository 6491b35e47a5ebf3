//! OrderedStore - named score-ordered sets backing the recency feeds.

use crate::error::StoreError;

/// One mutation against an ordered set.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderedOp {
    /// Insert `member` or move it to `score`.
    Add {
        key: String,
        member: String,
        score: f64,
    },
    /// Remove members if present.
    Remove { key: String, members: Vec<String> },
    /// Remove the members ranked `start..=stop` in ascending score order.
    /// Negative ranks count from the highest-scored end (`-1` is the last).
    RemoveRankRange {
        key: String,
        start: isize,
        stop: isize,
    },
}

/// Sorted collections of `(member, score)` keyed by name.
///
/// Members with equal scores are ordered by member, ascending.
pub trait OrderedStore: Send + Sync {
    /// Apply a batch of operations as one unit, in order.
    fn exec(&self, ops: Vec<OrderedOp>) -> Result<(), StoreError>;

    /// Members ranked `start..=stop` in descending score order.
    fn rev_range(&self, key: &str, start: usize, stop: usize) -> Result<Vec<String>, StoreError>;

    /// Number of members in the set.
    fn card(&self, key: &str) -> Result<usize, StoreError>;

    /// Score of a member, if present.
    fn score(&self, key: &str, member: &str) -> Result<Option<f64>, StoreError>;

    /// Add or update one member.
    fn add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.exec(vec![OrderedOp::Add {
            key: key.to_string(),
            member: member.to_string(),
            score,
        }])
    }

    /// Remove members.
    fn remove(&self, key: &str, members: &[String]) -> Result<(), StoreError> {
        self.exec(vec![OrderedOp::Remove {
            key: key.to_string(),
            members: members.to_vec(),
        }])
    }

    /// Remove a rank range (see [`OrderedOp::RemoveRankRange`]).
    fn remove_rank_range(&self, key: &str, start: isize, stop: isize) -> Result<(), StoreError> {
        self.exec(vec![OrderedOp::RemoveRankRange {
            key: key.to_string(),
            start,
            stop,
        }])
    }
}
