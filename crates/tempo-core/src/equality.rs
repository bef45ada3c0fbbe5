//! Deep equality and stable serialization for detecting no-op edits.
//!
//! Documents are compared through their canonical JSON form, in which every
//! object's keys are sorted. Two values that differ only in field order or in
//! how their maps were built produce the same canonical value and the same
//! serialized string, whichever map ordering `serde_json` is built with.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Converts any serializable value into its canonical JSON form.
pub fn canonical<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(sort_keys(serde_json::to_value(value)?))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(key, value)| (key, sort_keys(value))).collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Compact serialization that is identical for deep-equal values.
pub fn stable_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(&canonical(value)?)?)
}

/// Structural equality of two values through their canonical forms.
pub fn deep_equal<A, B>(a: &A, b: &B) -> Result<bool>
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    Ok(canonical(a)? == canonical(b)?)
}

/// Cached canonical form of a value.
///
/// The autosave queue keeps one of these for the last seeded document and
/// for the document currently being saved, so every incoming edit costs a
/// single serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint(Value);

impl Fingerprint {
    /// Computes the fingerprint of a value.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        canonical(value).map(Self)
    }

    /// The canonical value this fingerprint was computed from.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": {"y": 2, "x": 3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": {"x": 3, "y": 2}, "b": 1}"#).unwrap();

        assert!(deep_equal(&a, &b).unwrap());
        assert_eq!(stable_string(&a).unwrap(), stable_string(&b).unwrap());
        assert_eq!(stable_string(&a).unwrap(), r#"{"a":{"x":3,"y":2},"b":1}"#);
    }

    #[test]
    fn test_hash_map_serialization_is_stable() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for i in 0..32 {
            first.insert(format!("k{i}"), i);
        }
        for i in (0..32).rev() {
            second.insert(format!("k{i}"), i);
        }

        assert_eq!(stable_string(&first).unwrap(), stable_string(&second).unwrap());
    }

    #[test]
    fn test_objects_inside_arrays_are_sorted() {
        let mut reversed = serde_json::Map::new();
        reversed.insert("z".to_string(), json!(1));
        reversed.insert("a".to_string(), json!({"y": 2, "b": 3}));
        let value = json!([Value::Object(reversed)]);

        assert_eq!(
            stable_string(&value).unwrap(),
            r#"[{"a":{"b":3,"y":2},"z":1}]"#
        );
        assert_eq!(
            canonical(&value).unwrap()[0].as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["a", "z"]
        );
    }

    #[test]
    fn test_array_order_matters() {
        assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])).unwrap());
    }

    #[test]
    fn test_fingerprint_compares_across_types() {
        #[derive(Serialize)]
        struct Doc {
            v: u32,
        }

        let fp = Fingerprint::of(&Doc { v: 1 }).unwrap();
        assert_eq!(fp, Fingerprint::of(&json!({"v": 1})).unwrap());
        assert_ne!(fp, Fingerprint::of(&json!({"v": 2})).unwrap());
        assert_eq!(fp.as_value(), &json!({"v": 1}));
    }
}
