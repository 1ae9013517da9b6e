use serde_json::json;
use vizij_path_core::{
    expand_object_paths, expand_object_paths_in_place, object_from_path, JsonAccessor,
    PathSegment, PropertyAccessor, PropertyPath, MAX_INDEX,
};

#[test]
fn indexed_key_expands_into_null_padded_array() {
    let out = expand_object_paths(json!({ "foo[1].bar": "value" }));
    assert_eq!(out, json!({ "foo": [null, { "bar": "value" }] }));
}

#[test]
fn nested_dotted_key() {
    let out = expand_object_paths(json!({ "nested.test.path": "value" }));
    assert_eq!(out, json!({ "nested": { "test": { "path": "value" } } }));
}

#[test]
fn object_from_path_exact_shape() {
    let out = object_from_path(&PropertyPath::parse("nested.test[2].path"), json!("value"));
    assert_eq!(
        out,
        json!({ "nested": { "test": [null, null, { "path": "value" }] } })
    );
}

#[test]
fn independent_indices_merge() {
    let out = expand_object_paths(json!({ "foo[1].bar": 10, "foo[0].bar": 20 }));
    assert_eq!(out, json!({ "foo": [{ "bar": 20 }, { "bar": 10 }] }));
}

#[test]
fn sibling_keys_under_same_index_merge() {
    let out = expand_object_paths(json!({
        "transforms[0].type": "filter",
        "transforms[0].target.field": "x",
        "transforms[0].value": 3
    }));
    assert_eq!(
        out,
        json!({ "transforms": [{ "type": "filter", "target": { "field": "x" }, "value": 3 }] })
    );
}

#[test]
fn nested_arrays_under_same_index_overwrite() {
    // The second key replaces the whole `range` array written by the first.
    let out = expand_object_paths(json!({
        "marker[1].range[1]": 5,
        "marker[1].range[0]": 4
    }));
    assert_eq!(out, json!({ "marker": [null, { "range": [4] }] }));
}

#[test]
fn dotted_arrays_at_same_path_overwrite() {
    let out = expand_object_paths(json!({ "xaxis.range[1]": 5, "xaxis.range[0]": 4 }));
    assert_eq!(out, json!({ "xaxis": { "range": [4] } }));
}

#[test]
fn nested_flat_values_are_expanded() {
    let out = expand_object_paths(json!({
        "layout": { "xaxis.title.text": "time", "yaxis[0]": 1 },
        "data[0]": { "marker.color": "red" }
    }));
    assert_eq!(
        out,
        json!({
            "layout": { "xaxis": { "title": { "text": "time" } }, "yaxis": [1] },
            "data": [{ "marker": { "color": "red" } }]
        })
    );
}

#[test]
fn malformed_keys_are_plain() {
    let input = json!({ "a[x].b": 1, "c[": 2, ".d": 3 });
    assert_eq!(expand_object_paths(input.clone()), input);
}

#[test]
fn expansion_is_idempotent() {
    let once = expand_object_paths(json!({
        "foo[1].bar": 10,
        "foo[0].bar": 20,
        "a.b.c": [1, 2],
        "plain": { "x": null }
    }));
    let mut twice = once.clone();
    expand_object_paths_in_place(&mut twice);
    assert_eq!(once, twice);
}

#[test]
fn expanded_values_are_reachable_by_path() {
    let flat = json!({ "foo[1].bar": "v", "a.b[2]": 7, "top": true });
    let out = expand_object_paths(flat.clone());
    for (key, value) in flat.as_object().unwrap() {
        let got = JsonAccessor.get(&out, &PropertyPath::parse(key));
        assert_eq!(got, Some(value), "{key}");
    }
}

#[test]
fn oversized_indices_stay_plain_keys() {
    let huge = format!("a[{}]", usize::MAX);
    let past_limit = format!("b[{}].c", MAX_INDEX + 1);
    let mut input = serde_json::Map::new();
    input.insert(huge.clone(), json!(1));
    input.insert(past_limit.clone(), json!(2));
    let input = serde_json::Value::Object(input);

    let out = expand_object_paths(input);
    assert_eq!(out[huge.as_str()], json!(1));
    assert_eq!(out[past_limit.as_str()], json!(2));

    let built = object_from_path(&PropertyPath::parse(&huge), json!(1));
    assert_eq!(built[huge.as_str()], json!(1));
}

#[test]
fn hand_built_oversized_index_does_not_allocate() {
    let path = PropertyPath::new(vec![
        PathSegment::indexed("a", usize::MAX),
        PathSegment::key("b"),
    ]);
    let key = format!("a[{}]", usize::MAX);

    let built = object_from_path(&path, json!(1));
    assert_eq!(built[key.as_str()], json!({ "b": 1 }));

    let mut root = json!({});
    JsonAccessor.set(&mut root, &path, json!(2));
    assert_eq!(root[key.as_str()]["b"], json!(2));
    assert_eq!(JsonAccessor.get(&root, &path), Some(&json!(2)));
}
