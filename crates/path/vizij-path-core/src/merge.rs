//! Deep merge of JSON trees that never concatenates or zips arrays.

use serde_json::{Map, Value};

/// Merge `src` into `dst` key by key.
///
/// - arrays in `src` replace whatever `dst` holds at that key, wholesale
/// - objects merge recursively (into `{}` when `dst` holds a non-object)
/// - every other value, `null` included, overwrites
///
/// A non-object `src` replaces `dst` entirely.
pub fn extend_deep_no_arrays(dst: &mut Value, src: Value) {
    match src {
        Value::Object(src_map) => {
            if !dst.is_object() {
                *dst = Value::Object(Map::new());
            }
            if let Value::Object(dst_map) = dst {
                merge_maps(dst_map, src_map);
            }
        }
        other => *dst = other,
    }
}

fn merge_maps(dst: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, copy) in src {
        match copy {
            Value::Object(_) => {
                let slot = dst.entry(key).or_insert(Value::Null);
                extend_deep_no_arrays(slot, copy);
            }
            // Same-key arrays are not merged element-wise: last writer wins.
            other => {
                dst.insert(key, other);
            }
        }
    }
}
