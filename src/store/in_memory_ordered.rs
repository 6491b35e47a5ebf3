//! InMemoryOrderedStore - BTreeSet-backed ordered sets.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use super::ordered::{OrderedOp, OrderedStore};
use crate::error::StoreError;

/// Score wrapper with a total order so it can live in a `BTreeSet`.
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Default)]
struct SortedSet {
    scores: HashMap<String, Score>,
    ranked: BTreeSet<(Score, String)>,
}

impl SortedSet {
    fn add(&mut self, member: String, score: f64) {
        let score = Score(score);
        if let Some(previous) = self.scores.insert(member.clone(), score) {
            self.ranked.remove(&(previous, member.clone()));
        }
        self.ranked.insert((score, member));
    }

    fn remove(&mut self, member: &str) {
        if let Some(previous) = self.scores.remove(member) {
            self.ranked.remove(&(previous, member.to_string()));
        }
    }

    fn remove_rank_range(&mut self, start: isize, stop: isize) {
        let Some((start, stop)) = normalize_range(start, stop, self.ranked.len()) else {
            return;
        };
        let doomed: Vec<(Score, String)> = self
            .ranked
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .cloned()
            .collect();
        for entry in doomed {
            self.scores.remove(&entry.1);
            self.ranked.remove(&entry);
        }
    }

    fn len(&self) -> usize {
        self.ranked.len()
    }
}

/// Resolve Redis-style rank bounds into an inclusive `(start, stop)` pair.
fn normalize_range(start: isize, stop: isize, len: usize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// In-memory ordered sets. Clone-friendly via `Arc`.
#[derive(Clone, Default)]
pub struct InMemoryOrderedStore {
    sets: Arc<RwLock<HashMap<String, SortedSet>>>,
}

impl InMemoryOrderedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every non-empty set.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let sets = self
            .sets
            .read()
            .map_err(|_| StoreError::LockPoisoned("ordered keys"))?;
        let mut keys: Vec<String> = sets
            .iter()
            .filter(|(_, set)| set.len() > 0)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl OrderedStore for InMemoryOrderedStore {
    fn exec(&self, ops: Vec<OrderedOp>) -> Result<(), StoreError> {
        let mut sets = self
            .sets
            .write()
            .map_err(|_| StoreError::LockPoisoned("ordered exec"))?;

        for op in ops {
            match op {
                OrderedOp::Add { key, member, score } => {
                    sets.entry(key).or_default().add(member, score);
                }
                OrderedOp::Remove { key, members } => {
                    if let Some(set) = sets.get_mut(&key) {
                        for member in &members {
                            set.remove(member);
                        }
                    }
                }
                OrderedOp::RemoveRankRange { key, start, stop } => {
                    if let Some(set) = sets.get_mut(&key) {
                        set.remove_rank_range(start, stop);
                    }
                }
            }
        }

        sets.retain(|_, set| set.len() > 0);
        Ok(())
    }

    fn rev_range(&self, key: &str, start: usize, stop: usize) -> Result<Vec<String>, StoreError> {
        let sets = self
            .sets
            .read()
            .map_err(|_| StoreError::LockPoisoned("ordered range"))?;
        let Some(set) = sets.get(key) else {
            return Ok(Vec::new());
        };
        if stop < start {
            return Ok(Vec::new());
        }
        Ok(set
            .ranked
            .iter()
            .rev()
            .skip(start)
            .take((stop - start).saturating_add(1))
            .map(|(_, member)| member.clone())
            .collect())
    }

    fn card(&self, key: &str) -> Result<usize, StoreError> {
        let sets = self
            .sets
            .read()
            .map_err(|_| StoreError::LockPoisoned("ordered card"))?;
        Ok(sets.get(key).map(SortedSet::len).unwrap_or(0))
    }

    fn score(&self, key: &str, member: &str) -> Result<Option<f64>, StoreError> {
        let sets = self
            .sets
            .read()
            .map_err(|_| StoreError::LockPoisoned("ordered score"))?;
        Ok(sets
            .get(key)
            .and_then(|set| set.scores.get(member))
            .map(|score| score.0))
    }
}
