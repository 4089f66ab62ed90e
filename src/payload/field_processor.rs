//! Lookup and removal of fields in a JSON payload by [`FieldPath`].
use serde_json::Value;

use super::field_path::{FieldPath, Segment};

pub fn has_field(path: &FieldPath, payload: &Value) -> bool {
    !extract(path, payload).is_empty()
}

/// Every value the path matches, in document order.
pub fn extract<'a>(path: &FieldPath, payload: &'a Value) -> Vec<&'a Value> {
    let mut matches = Vec::new();
    collect(payload, path.segments(), &mut matches);
    matches
}

fn collect<'a>(value: &'a Value, segments: &[Segment], matches: &mut Vec<&'a Value>) {
    let Some((segment, rest)) = segments.split_first() else {
        matches.push(value);
        return;
    };
    match (segment, value) {
        (Segment::Array, Value::Array(items)) => {
            for item in items {
                collect(item, rest, matches);
            }
        }
        (Segment::Key(key), Value::Object(map)) => {
            if let Some(child) = map.get(key) {
                collect(child, rest, matches);
            }
        }
        _ => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    /// Only scalars, empty containers and arrays of scalars are removed.
    Leaf,
    /// Whatever the path matches is removed.
    Subsection,
}

/// Removes the documented leaf values the path matches. Objects with
/// entries and arrays holding objects or arrays are kept, since their
/// contents need documenting in their own right. Containers emptied by the
/// removal are pruned.
pub fn remove(path: &FieldPath, payload: &mut Value) {
    remove_matches(payload, path.segments(), Removal::Leaf);
}

/// Removes everything the path matches, pruning emptied containers.
pub fn remove_subsection(path: &FieldPath, payload: &mut Value) {
    remove_matches(payload, path.segments(), Removal::Subsection);
}

/// Returns true when `value` was emptied by this call and its parent should
/// drop it.
fn remove_matches(value: &mut Value, segments: &[Segment], mode: Removal) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return false;
    };
    match (segment, value) {
        (Segment::Array, Value::Array(items)) => {
            let before = items.len();
            if rest.is_empty() {
                items.retain(|item| mode == Removal::Leaf && !is_empty_item(item));
            } else {
                items.retain_mut(|item| !remove_matches(item, rest, mode));
            }
            items.len() < before && items.is_empty()
        }
        (Segment::Key(key), Value::Object(map)) => {
            let drop_entry = match map.get_mut(key) {
                None => return false,
                Some(child) if rest.is_empty() => mode == Removal::Subsection || is_removable_leaf(child),
                Some(child) => remove_matches(child, rest, mode),
            };
            if drop_entry {
                map.shift_remove(key);
                map.is_empty()
            } else {
                false
            }
        }
        _ => false,
    }
}

fn is_removable_leaf(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => !items.iter().any(|i| i.is_object() || i.is_array()),
        _ => true,
    }
}

/// A list item is removable unless it is a container with entries.
fn is_empty_item(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => true,
    }
}

/// True for `null`, `{}` and `[]`.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
