//! Get/set access into a JSON tree through a [`PropertyPath`].

use serde_json::{Map, Value};

use crate::path::{PathSegment, PropertyPath};

/// Read/write access to a location in an object graph addressed by a path.
pub trait PropertyAccessor {
    /// Return the value at `path`, or `None` if any step is missing.
    fn get<'a>(&self, root: &'a Value, path: &PropertyPath) -> Option<&'a Value>;

    /// Store `value` at `path`, creating intermediate containers as needed.
    fn set(&self, root: &mut Value, path: &PropertyPath, value: Value);
}

/// The accessor used by both the expander and the template engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAccessor;

impl PropertyAccessor for JsonAccessor {
    fn get<'a>(&self, root: &'a Value, path: &PropertyPath) -> Option<&'a Value> {
        let mut current = root;
        for seg in path.segments() {
            let (name, index) = seg.addressable();
            current = own_property(current, &name)?;
            if let Some(idx) = index {
                current = current.as_array()?.get(idx)?;
            }
        }
        Some(current)
    }

    fn set(&self, root: &mut Value, path: &PropertyPath, value: Value) {
        let Some((last, parents)) = path.segments.split_last() else {
            return;
        };
        let mut current = root;
        for seg in parents {
            current = step_mut(current, seg, true);
        }
        *step_mut(current, last, false) = value;
    }
}

/// Own-property lookup: object keys, plus numeric names on arrays.
pub fn own_property<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => {
            if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            key.parse::<usize>().ok().and_then(|idx| items.get(idx))
        }
        _ => None,
    }
}

/// Walk one segment mutably, creating what is missing. When `container` is
/// set, the slot reached is turned into an object unless it already is one.
fn step_mut<'a>(current: &'a mut Value, seg: &PathSegment, container: bool) -> &'a mut Value {
    let (name, index) = seg.addressable();
    let map = ensure_object(current);
    let slot = map.entry(name.into_owned()).or_insert(Value::Null);
    let slot = match index {
        Some(idx) => {
            let items = ensure_array(slot);
            pad_to(items, idx);
            &mut items[idx]
        }
        None => slot,
    };
    if container && !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot
}

/// Make `value` an object (replacing anything else) and return its map.
pub fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just made an object"),
    }
}

/// Make `value` an array (replacing anything else) and return its items.
pub fn ensure_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    match value {
        Value::Array(items) => items,
        _ => unreachable!("value was just made an array"),
    }
}

/// Grow `items` with nulls so that `idx` is addressable. Callers bound `idx`
/// by [`MAX_INDEX`](crate::path::MAX_INDEX).
pub fn pad_to(items: &mut Vec<Value>, idx: usize) {
    if items.len() <= idx {
        items.resize(idx.saturating_add(1), Value::Null);
    }
}
