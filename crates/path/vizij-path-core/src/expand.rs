//! Expansion of flat, patch-style mappings into nested trees.
//!
//! A flat mapping such as `{ "marker.color": "red", "x[1]": 3 }` becomes
//! `{ "marker": { "color": "red" }, "x": [null, 3] }`. Keys sharing a prefix
//! are merged with [`extend_deep_no_arrays`], so two keys that write whole
//! arrays at the same location do not combine: the later key wins.
//!
//! ```
//! use serde_json::json;
//! use vizij_path_core::expand_object_paths;
//!
//! let out = expand_object_paths(json!({ "foo[1].bar": 10, "foo[0].bar": 20 }));
//! assert_eq!(out, json!({ "foo": [{ "bar": 20 }, { "bar": 10 }] }));
//! ```

use serde_json::{Map, Value};

use crate::accessor::{ensure_array, ensure_object, pad_to};
use crate::merge::extend_deep_no_arrays;
use crate::path::{PathKey, PropertyPath};

/// Build a new tree whose leaf at `path` is `value`.
///
/// Indexed segments produce arrays padded with `null` below the index:
/// `object_from_path("nested.test[2].path", "value")` gives
/// `{ "nested": { "test": [null, null, { "path": "value" }] } }`.
pub fn object_from_path(path: &PropertyPath, value: Value) -> Value {
    let mut root = Value::Object(Map::new());
    let Some((last, parents)) = path.segments.split_last() else {
        return root;
    };

    let mut current = &mut root;
    for seg in parents {
        let (name, index) = seg.addressable();
        let slot = ensure_object(current)
            .entry(name.into_owned())
            .or_insert(Value::Null);
        current = match index {
            Some(idx) => {
                let items = ensure_array(slot);
                pad_to(items, idx);
                &mut items[idx]
            }
            None => slot,
        };
        *current = Value::Object(Map::new());
    }

    let (name, index) = last.addressable();
    let map = ensure_object(current);
    match index {
        Some(idx) => {
            let mut items = vec![Value::Null; idx];
            items.push(value);
            map.insert(name.into_owned(), Value::Array(items));
        }
        None => {
            map.insert(name.into_owned(), value);
        }
    }
    root
}

/// Expand every dotted/indexed key of `value`, recursively. Non-objects are
/// returned as-is (arrays are not descended into).
pub fn expand_object_paths(mut value: Value) -> Value {
    expand_object_paths_in_place(&mut value);
    value
}

/// In-place variant of [`expand_object_paths`].
pub fn expand_object_paths_in_place(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    // Keys added while expanding are already expanded; only visit the originals.
    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        match PathKey::classify(&key) {
            PathKey::Dotted { head, rest } => {
                let Some(datum) = map.remove(&key) else {
                    continue;
                };
                let tree = object_from_path(&rest, expand_object_paths(datum));
                let slot = map.entry(head).or_insert(Value::Null);
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                extend_deep_no_arrays(slot, tree);
            }
            PathKey::Indexed { head, index, rest } => {
                let Some(datum) = map.remove(&key) else {
                    continue;
                };
                let items = ensure_array(map.entry(head).or_insert(Value::Null));
                pad_to(items, index);
                let datum = expand_object_paths(datum);
                match rest {
                    Some(rest) => {
                        let dest = &mut items[index];
                        if !dest.is_object() {
                            *dest = Value::Object(Map::new());
                        }
                        // Whole arrays written under the same index replace each
                        // other here (`a[0].b[1]` then `a[0].b[0]` keeps only the latter).
                        extend_deep_no_arrays(dest, object_from_path(&rest, datum));
                    }
                    None => items[index] = datum,
                }
            }
            PathKey::Plain => {
                if let Some(inner) = map.get_mut(&key) {
                    expand_object_paths_in_place(inner);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_from_path_builds_padded_arrays() {
        let out = object_from_path(&PropertyPath::parse("nested.test[2].path"), json!("value"));
        assert_eq!(
            out,
            json!({ "nested": { "test": [null, null, { "path": "value" }] } })
        );
    }

    #[test]
    fn object_from_path_terminal_index() {
        let out = object_from_path(&PropertyPath::parse("range[1]"), json!(5));
        assert_eq!(out, json!({ "range": [null, 5] }));
    }

    #[test]
    fn object_from_path_single_key() {
        let out = object_from_path(&PropertyPath::parse("a"), json!([1, 2]));
        assert_eq!(out, json!({ "a": [1, 2] }));
    }

    #[test]
    fn dotted_keys_merge_under_head() {
        let out = expand_object_paths(json!({
            "marker.color": "red",
            "marker.line.width": 2,
            "marker": { "size": 4 }
        }));
        assert_eq!(
            out,
            json!({ "marker": { "size": 4, "color": "red", "line": { "width": 2 } } })
        );
    }

    #[test]
    fn terminal_index_assigns_directly() {
        let out = expand_object_paths(json!({ "xaxis.range[1]": 9, "yrange[0]": { "a.b": 1 } }));
        assert_eq!(
            out,
            json!({ "xaxis": { "range": [null, 9] }, "yrange": [{ "a": { "b": 1 } }] })
        );
    }

    #[test]
    fn scalar_head_is_replaced() {
        let out = expand_object_paths(json!({ "a": 1, "a.b": 2 }));
        assert_eq!(out, json!({ "a": { "b": 2 } }));
    }

    #[test]
    fn arrays_are_not_descended() {
        let input = json!({ "list": [{ "a.b": 1 }] });
        assert_eq!(expand_object_paths(input.clone()), input);
    }

    #[test]
    fn non_objects_pass_through() {
        assert_eq!(expand_object_paths(json!(3)), json!(3));
        assert_eq!(expand_object_paths(json!("a.b")), json!("a.b"));
    }
}
