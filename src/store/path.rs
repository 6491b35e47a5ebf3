//! Dotted field paths over JSON documents.
//!
//! Paths descend through objects by key and fan out over arrays, so
//! `run.players.id` yields the id of every player. This mirrors how document
//! stores resolve field paths in filters and group-by expressions.

use serde_json::Value;

/// Resolve every value reachable through `path`.
///
/// Arrays met along the way (including at the leaf) are flattened, so the
/// result never contains an array produced by fan-out.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];

    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let mut next = Vec::new();
        for value in current {
            collect_field(value, segment, &mut next);
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    let mut out = Vec::with_capacity(current.len());
    for value in current {
        match value {
            Value::Array(items) => out.extend(items.iter()),
            other => out.push(other),
        }
    }
    out
}

/// Resolve the first value reachable through `path`, ignoring nulls.
pub fn lookup_first<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    lookup(doc, path).into_iter().find(|v| !v.is_null())
}

fn collect_field<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(field) = map.get(key) {
                out.push(field);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_field(item, key, out);
            }
        }
        _ => {}
    }
}

/// Render a scalar as the string used for ids and group keys.
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
