//! Document filters for primary-store queries.
//!
//! A `Filter` is a conjunction of clauses over dotted paths. A clause matches
//! when any value reachable through its path satisfies the condition, so an
//! equality clause on `run.players.id` matches a run with that player anywhere
//! in its player list.

use std::cmp::Ordering;

use serde_json::Value;

use super::path;

/// A single clause condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value.
    Eq(Value),
    /// Field is greater than or equal to the value.
    Gte(Value),
    /// Field is strictly less than the value.
    Lt(Value),
    /// Field is present and not null.
    Exists,
}

impl Condition {
    fn matches(&self, candidate: &Value) -> bool {
        match self {
            Condition::Eq(expected) => candidate == expected,
            Condition::Gte(bound) => {
                matches!(compare(candidate, bound), Some(Ordering::Greater | Ordering::Equal))
            }
            Condition::Lt(bound) => matches!(compare(candidate, bound), Some(Ordering::Less)),
            Condition::Exists => !candidate.is_null(),
        }
    }
}

/// Conjunction of path clauses. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `path` to equal `value`.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((path.into(), Condition::Eq(value.into())));
        self
    }

    /// Require `path` to lie in `[from, until)`.
    pub fn range(
        mut self,
        path: impl Into<String>,
        from: impl Into<Value>,
        until: impl Into<Value>,
    ) -> Self {
        let path = path.into();
        self.clauses.push((path.clone(), Condition::Gte(from.into())));
        self.clauses.push((path, Condition::Lt(until.into())));
        self
    }

    /// Require `path` to be present.
    pub fn exists(mut self, path: impl Into<String>) -> Self {
        self.clauses.push((path.into(), Condition::Exists));
        self
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }

    /// Check a document against every clause.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|(field, condition)| {
            path::lookup(doc, field)
                .into_iter()
                .any(|candidate| condition.matches(candidate))
        })
    }
}

/// Compare two JSON scalars of the same kind. Mixed kinds are unordered.
pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
