//! Typed extractors over untyped JSON values.
//!
//! Decoders compose these instead of re-deriving checks per response shape.
//! Every extractor fails fast with a [`DecodeError`] naming the field.

use serde_json::{Map, Value};

use crate::error::{DecodeError, DecodeResult};

/// JSON object as seen by the extractors
pub type Object = Map<String, Value>;

/// Require `value` to be a JSON object
pub fn as_object<'a>(value: &'a Value, what: &str) -> DecodeResult<&'a Object> {
    value.as_object().ok_or_else(|| DecodeError::not_object(what))
}

/// Absent and `null` both mean "not present"
fn present<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn wrong_type(field: &str, expected: &'static str) -> DecodeError {
    DecodeError::WrongType {
        field: field.to_string(),
        expected,
    }
}

fn string_value(value: Option<&Value>, field: &str) -> DecodeResult<String> {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| wrong_type(field, "string"))
}

fn u64_value(value: Option<&Value>, field: &str) -> DecodeResult<u64> {
    value.and_then(Value::as_u64).ok_or_else(|| wrong_type(field, "number"))
}

fn string_array_value(value: Option<&Value>, field: &str) -> DecodeResult<Vec<String>> {
    let not_strings = || DecodeError::NotStringArray {
        field: field.to_string(),
    };
    value
        .and_then(Value::as_array)
        .ok_or_else(not_strings)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(not_strings))
        .collect()
}

pub fn expect_string(obj: &Object, field: &str) -> DecodeResult<String> {
    string_value(obj.get(field), field)
}

pub fn expect_bool(obj: &Object, field: &str) -> DecodeResult<bool> {
    obj.get(field)
        .and_then(Value::as_bool)
        .ok_or_else(|| wrong_type(field, "boolean"))
}

/// Non-negative integer field
pub fn expect_u64(obj: &Object, field: &str) -> DecodeResult<u64> {
    u64_value(obj.get(field), field)
}

pub fn expect_string_array(obj: &Object, field: &str) -> DecodeResult<Vec<String>> {
    string_array_value(obj.get(field), field)
}

pub fn expect_array<'a>(obj: &'a Object, field: &str) -> DecodeResult<&'a Vec<Value>> {
    obj.get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::NotArray {
            field: field.to_string(),
        })
}

pub fn optional_string(obj: &Object, field: &str) -> DecodeResult<Option<String>> {
    present(obj, field)
        .map(|v| string_value(Some(v), field))
        .transpose()
}

pub fn optional_u64(obj: &Object, field: &str) -> DecodeResult<Option<u64>> {
    present(obj, field).map(|v| u64_value(Some(v), field)).transpose()
}

pub fn optional_string_array(obj: &Object, field: &str) -> DecodeResult<Option<Vec<String>>> {
    present(obj, field)
        .map(|v| string_array_value(Some(v), field))
        .transpose()
}

/// String field that must equal `literal` exactly
pub fn expect_literal(obj: &Object, field: &str, literal: &str) -> DecodeResult<()> {
    if expect_string(obj, field)? != literal {
        return Err(DecodeError::WrongLiteral {
            field: field.to_string(),
            expected: literal.to_string(),
        });
    }
    Ok(())
}

/// Boolean discriminant that must be exactly `true`
pub fn expect_true(obj: &Object, field: &str) -> DecodeResult<()> {
    match obj.get(field) {
        Some(Value::Bool(true)) => Ok(()),
        _ => Err(DecodeError::WrongLiteral {
            field: field.to_string(),
            expected: "true".to_string(),
        }),
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), canonicalize(&obj[key.as_str()]));
            }
            Value::Object(out)
        },
        other => other.clone(),
    }
}

/// Pretty JSON with recursively sorted keys and a trailing newline
pub fn canonical_json(value: &Value) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(&canonicalize(value))?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_expect_string() {
        let o = obj(json!({ "name": "foo", "n": 1 }));
        assert_eq!(expect_string(&o, "name").unwrap(), "foo");
        assert_eq!(
            expect_string(&o, "n").unwrap_err().to_string(),
            "n must be a string"
        );
        assert_eq!(
            expect_string(&o, "missing").unwrap_err().to_string(),
            "missing must be a string"
        );
    }

    #[test]
    fn test_optional_treats_null_as_absent() {
        let o = obj(json!({ "a": null, "b": "x", "c": 3 }));
        assert_eq!(optional_string(&o, "a").unwrap(), None);
        assert_eq!(optional_string(&o, "missing").unwrap(), None);
        assert_eq!(optional_string(&o, "b").unwrap(), Some("x".to_string()));
        assert!(optional_string(&o, "c").is_err());
    }

    #[test]
    fn test_string_array_rejects_mixed_elements() {
        let o = obj(json!({ "ok": ["a", "b"], "bad": ["a", 1], "empty": [] }));
        assert_eq!(expect_string_array(&o, "ok").unwrap(), vec!["a", "b"]);
        assert!(expect_string_array(&o, "empty").unwrap().is_empty());
        assert_eq!(
            expect_string_array(&o, "bad").unwrap_err().to_string(),
            "bad must be an array of strings"
        );
    }

    #[test]
    fn test_numbers() {
        let o = obj(json!({ "n": 20, "f": 1.5, "neg": -1, "s": "20" }));
        assert_eq!(expect_u64(&o, "n").unwrap(), 20);
        assert!(expect_u64(&o, "f").is_err());
        assert!(expect_u64(&o, "neg").is_err());
        assert!(expect_u64(&o, "s").is_err());
    }

    #[test]
    fn test_discriminants_need_exact_values() {
        let o = obj(json!({ "ok": true, "truthy": 1, "no": false, "schema": "v1" }));
        assert!(expect_true(&o, "ok").is_ok());
        assert!(expect_true(&o, "truthy").is_err());
        assert!(expect_true(&o, "no").is_err());
        assert_eq!(
            expect_true(&o, "missing").unwrap_err().to_string(),
            "missing must be true"
        );
        assert!(expect_literal(&o, "schema", "v1").is_ok());
        assert_eq!(
            expect_literal(&o, "schema", "v2").unwrap_err().to_string(),
            "schema must be v2"
        );
    }

    #[test]
    fn test_as_object() {
        assert!(as_object(&json!({}), "doc").is_ok());
        assert_eq!(
            as_object(&json!([1]), "doc").unwrap_err().to_string(),
            "doc must be an object"
        );
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({ "b": 1, "a": { "d": [ { "z": 1, "y": 2 } ], "c": null } });
        let out = canonical_json(&value).unwrap();
        let a = out.find("\"a\"").unwrap();
        let b = out.find("\"b\"").unwrap();
        let y = out.find("\"y\"").unwrap();
        let z = out.find("\"z\"").unwrap();
        assert!(a < b);
        assert!(y < z);
        assert!(out.ends_with("}\n"));
    }
}
