//! Structural deep merge of a configuration document onto the record.

use serde_json::Value;

/// Deep-merge `source` onto `target`.
///
/// Objects merge key-by-key recursively. Sequences are replaced wholesale by
/// the overriding sequence, never concatenated or merged element-wise. Keys
/// absent from `target` are ignored, which keeps the key set closed to
/// whatever the Default Table established. A source value whose JSON kind
/// differs from the target's is dropped for that key; the target keeps its
/// previous value and its type never widens.
pub(crate) fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                let Some(target_value) = target_map.get_mut(key) else {
                    continue;
                };
                if !same_kind(target_value, source_value) {
                    continue;
                }
                if target_value.is_object() {
                    deep_merge(target_value, source_value);
                } else {
                    *target_value = source_value.clone();
                }
            }
        }
        (target, source) => {
            if same_kind(target, source) {
                *target = source.clone();
            }
        }
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_overwrite() {
        let mut target = json!({"a": 1, "b": "x"});
        deep_merge(&mut target, &json!({"a": 2}));
        assert_eq!(target, json!({"a": 2, "b": "x"}));
    }

    #[test]
    fn test_nested_objects_merge_key_by_key() {
        let mut target = json!({"section": {"save": true, "interval": 1}});
        deep_merge(&mut target, &json!({"section": {"interval": 5}}));
        assert_eq!(target, json!({"section": {"save": true, "interval": 5}}));
    }

    #[test]
    fn test_sequences_replaced_wholesale() {
        let mut target = json!({"list": ["a", "b"]});
        deep_merge(&mut target, &json!({"list": ["c"]}));
        assert_eq!(target, json!({"list": ["c"]}));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut target = json!({"a": 1});
        deep_merge(&mut target, &json!({"a": 2, "intruder": 3}));
        assert_eq!(target, json!({"a": 2}));
    }

    #[test]
    fn test_kind_mismatch_dropped() {
        let mut target = json!({"a": 1, "b": {"save": true}});
        deep_merge(&mut target, &json!({"a": "oops", "b": [1, 2]}));
        assert_eq!(target, json!({"a": 1, "b": {"save": true}}));
    }

    #[test]
    fn test_null_never_applied() {
        let mut target = json!({"a": 1});
        deep_merge(&mut target, &json!({"a": null}));
        assert_eq!(target, json!({"a": 1}));
    }

    #[test]
    fn test_deep_unknown_keys_ignored() {
        let mut target = json!({"section": {"save": true}});
        deep_merge(&mut target, &json!({"section": {"save": false, "extra": 9}}));
        assert_eq!(target, json!({"section": {"save": false}}));
    }
}
