//! Wildcard-aware writer for destination documents
//!
//! [`set`] writes a value at a path that may contain `#` segments. Each
//! wildcard is expanded against the length of the array that exists at that
//! position *when the call is made*; a missing or empty array expands to no
//! writes at all. Rules writing through a wildcard therefore depend on an
//! earlier rule having created and sized the array.
//!
//! Copyright (c) 2025 Sloconv Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::path::{Path, Segment};
use serde_json::{Map, Value};

/// Most `null` slots a single write may pad an array with
pub const MAX_ARRAY_GAP: usize = 1024;

/// Set `value` at `path`, fanning out over every `#` segment
///
/// Given the document `{"A":[{"B":"C"},{"D":"E"}]}`, the path `A.#.D` and
/// the value `"X"`, the result is `{"A":[{"B":"C","D":"X"},{"D":"X"}]}`.
pub fn set(doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
    let Some(position) = path.first_wildcard() else {
        return set_indexed(doc, path, value.clone());
    };
    let length = get(doc, &path.prefix(position))
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    for index in 0..length {
        set(doc, &path.with_index_at(position, index), value)?;
    }
    Ok(())
}

/// Read the value at a concrete path
pub fn get<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(doc, |current, segment| match (current, segment) {
            (Value::Object(map), segment) if !segment.is_wildcard() => map.get(segment.raw().as_ref()),
            (Value::Array(items), segment) => segment.index().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Plain write at a path without wildcards, creating containers as needed
///
/// Missing intermediate containers are created as arrays when the next
/// segment is an index and as objects otherwise. Arrays grow with `null`
/// padding of at most [`MAX_ARRAY_GAP`] slots. Writing a named member into
/// an array, or descending through a scalar, is a conflict.
pub fn set_indexed(doc: &mut Value, path: &Path, value: Value) -> Result<()> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Err(Error::write(path, "cannot replace the document root"));
    };
    let mut current = doc;
    for segment in parents {
        current = slot(current, segment, path)?;
    }
    *slot(current, last, path)? = value;
    Ok(())
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Index(_) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}

/// Mutable reference to the child `segment` of `container`, creating it as `null`
fn slot<'a>(container: &'a mut Value, segment: &Segment, path: &Path) -> Result<&'a mut Value> {
    if container.is_null() {
        *container = empty_container_for(segment);
    }
    match container {
        Value::Object(map) => {
            if segment.is_wildcard() {
                return Err(Error::write(path, "unexpanded wildcard"));
            }
            Ok(map.entry(segment.raw().into_owned()).or_insert(Value::Null))
        }
        Value::Array(items) => {
            let index = segment.index().ok_or_else(|| {
                Error::write(path, format!("cannot set field '{}' on an array", segment.raw()))
            })?;
            if items.len() <= index {
                if index - items.len() > MAX_ARRAY_GAP {
                    return Err(Error::write(
                        path,
                        format!("index {} is too far past the array end ({})", index, items.len()),
                    ));
                }
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        scalar => Err(Error::write(
            path,
            format!(
                "cannot descend into {} at '{}'",
                crate::error::value_type_name(scalar),
                segment.raw()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(mut doc: Value, path: &str, value: Value) -> Value {
        set(&mut doc, &Path::parse(path), &value).unwrap();
        doc
    }

    #[test]
    fn test_set_without_wildcard() {
        assert_eq!(run(json!({"A": {"B": "foo"}}), "A.B", json!("bar")), json!({"A": {"B": "bar"}}));
        assert_eq!(
            run(json!({"A": {"B": {}}}), "A.B.C", json!("value")),
            json!({"A": {"B": {"C": "value"}}})
        );
    }

    #[test]
    fn test_set_simple_list() {
        assert_eq!(run(json!({"A": ["a", "b"]}), "A.#", json!("c")), json!({"A": ["c", "c"]}));
    }

    #[test]
    fn test_set_list_of_objects() {
        assert_eq!(
            run(json!({"A": [{"B": "C"}, {"D": "E"}]}), "A.#.D", json!("X")),
            json!({"A": [{"B": "C", "D": "X"}, {"D": "X"}]})
        );
    }

    #[test]
    fn test_set_nested_wildcards() {
        let doc = json!({"A": [{"B": [{"C": "D"}, {"C": "D"}]}, {"B": [{"C": "D"}, {"C": "D"}]}]});
        assert_eq!(
            run(doc, "A.#.B.#.E", json!("X")),
            json!({"A": [
                {"B": [{"C": "D", "E": "X"}, {"C": "D", "E": "X"}]},
                {"B": [{"C": "D", "E": "X"}, {"C": "D", "E": "X"}]}
            ]})
        );
    }

    #[test]
    fn test_wildcard_over_missing_array_is_noop() {
        assert_eq!(run(json!({}), "A.#.B", json!(1)), json!({}));
        assert_eq!(run(json!({"A": []}), "A.#.B", json!(1)), json!({"A": []}));
    }

    #[test]
    fn test_creates_arrays_for_index_segments() {
        assert_eq!(
            run(json!({}), "spec.timeWindows.0.unit", json!("Day")),
            json!({"spec": {"timeWindows": [{"unit": "Day"}]}})
        );
        assert_eq!(run(json!({}), "a.2", json!(true)), json!({"a": [null, null, true]}));
    }

    #[test]
    fn test_index_far_past_array_end_is_a_conflict() {
        let mut doc = json!({"a": [1]});
        let err = set(&mut doc, &Path::parse("a.18446744073709551615"), &json!(1)).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(set(&mut doc, &Path::parse("a.4000000000"), &json!(1)).is_err());
        assert_eq!(doc, json!({"a": [1]}));

        let mut doc = json!({});
        let within = format!("a.{}", MAX_ARRAY_GAP);
        set(&mut doc, &Path::parse(&within), &json!(true)).unwrap();
        assert_eq!(doc["a"].as_array().map(Vec::len), Some(MAX_ARRAY_GAP + 1));
        assert!(set(&mut json!({}), &Path::parse(&format!("a.{}", MAX_ARRAY_GAP + 1)), &json!(1)).is_err());
    }

    #[test]
    fn test_index_on_object_is_a_key() {
        assert_eq!(run(json!({"a": {}}), "a.0", json!(1)), json!({"a": {"0": 1}}));
    }

    #[test]
    fn test_field_on_array_is_a_conflict() {
        let mut doc = json!({"a": [1, 2]});
        let err = set(&mut doc, &Path::parse("a.b"), &json!(1)).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_descending_into_scalar_is_a_conflict() {
        let mut doc = json!({"a": "text"});
        assert!(set(&mut doc, &Path::parse("a.b"), &json!(1)).is_err());
    }

    #[test]
    fn test_root_write_is_rejected() {
        let mut doc = json!({});
        assert!(set_indexed(&mut doc, &Path::root(), json!(1)).is_err());
    }

    #[test]
    fn test_get() {
        let doc = json!({"a": [{"b": 1}], "c.d": 2});
        assert_eq!(get(&doc, &Path::parse("a.0.b")), Some(&json!(1)));
        assert_eq!(get(&doc, &Path::parse("c\\.d")), Some(&json!(2)));
        assert_eq!(get(&doc, &Path::parse("a.1")), None);
    }
}
