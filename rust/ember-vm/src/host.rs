//! JSON bridge for hosts that exchange script values as `serde_json::Value`.

use crate::env::{Env, Environment};
use ember_core::Value;
use serde_json::{Map, Number, Value as Json};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("environment json must be an object, got {0}")]
    NotAnObject(&'static str),
    #[error("{0} has no json representation")]
    Unrepresentable(String),
    #[error("value nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Nesting bound for [`value_to_json`]; aggregates can contain themselves.
const MAX_DEPTH: usize = 128;

pub fn value_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::new_slice(items.iter().map(value_from_json).collect()),
        Json::Object(entries) => Value::new_map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), value_from_json(v)))
                .collect(),
        ),
    }
}

/// Convert back to JSON. Callables and native handles have no JSON form.
pub fn value_to_json(value: &Value) -> Result<Json, HostError> {
    to_json(value, 0)
}

fn to_json(value: &Value, depth: usize) -> Result<Json, HostError> {
    if depth > MAX_DEPTH {
        return Err(HostError::TooDeep(MAX_DEPTH));
    }
    Ok(match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int32(n) => Json::from(*n),
        Value::Int(n) => Json::from(*n),
        Value::Float32(f) => float(f64::from(*f)),
        Value::Float(f) => float(*f),
        Value::String(s) => Json::String(s.to_string()),
        Value::Char(c) => Json::String(c.to_string()),
        Value::Slice(items) => Json::Array(
            items
                .borrow()
                .iter()
                .map(|v| to_json(v, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(entries) => {
            let mut out = Map::new();
            for (k, v) in entries.borrow().iter() {
                out.insert(k.clone(), to_json(v, depth + 1)?);
            }
            Json::Object(out)
        }
        Value::Func(_) | Value::Native(_) => {
            return Err(HostError::Unrepresentable(value.type_name().to_string()))
        }
    })
}

fn float(f: f64) -> Json {
    Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null)
}

impl Env {
    /// Seed an environment from the top-level keys of a JSON object.
    pub fn from_json_object(json: &Json) -> Result<Self, HostError> {
        let Json::Object(entries) = json else {
            return Err(HostError::NotAnObject(json_kind(json)));
        };
        let mut env = Env::new();
        for (name, value) in entries {
            env.set(name, value_from_json(value));
        }
        Ok(env)
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::FuncValue;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let v = value_from_json(&json!({"a": [1, 2.5, "x", null, true]}));
        assert_eq!(v.to_string(), "map[a:[1 2.5 x nil true]]");
        let a = v.as_map().unwrap().borrow().get("a").cloned().unwrap();
        let items = a.as_slice().unwrap().borrow();
        assert_eq!(items[0], Value::Int(1));
        assert_eq!(items[1], Value::Float(2.5));
    }

    #[test]
    fn test_to_json_widens_and_nulls_non_finite() {
        let v = Value::new_slice(vec![
            Value::Int32(3),
            Value::Float32(0.5),
            Value::Char('c'),
            Value::Float(f64::INFINITY),
        ]);
        assert_eq!(value_to_json(&v), Ok(json!([3, 0.5, "c", null])));
    }

    #[test]
    fn test_to_json_rejects_callables() {
        let f = Value::new_func(FuncValue::new("f", |_| Value::Nil));
        assert_eq!(value_to_json(&f), Err(HostError::Unrepresentable("func".into())));
    }

    #[test]
    fn test_self_referencing_slice() {
        let v = Value::new_slice(vec![]);
        if let Value::Slice(items) = &v {
            items.borrow_mut().push(v.clone());
        }
        assert_eq!(value_to_json(&v), Err(HostError::TooDeep(MAX_DEPTH)));
        // break the cycle so the test does not leak
        if let Value::Slice(items) = &v {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn test_env_from_json_object() {
        let env = Env::from_json_object(&json!({"a": 1, "b": "two"})).unwrap();
        assert_eq!(env.get("a"), Ok(Value::Int(1)));
        assert_eq!(env.get("b"), Ok(Value::from("two")));
        assert_eq!(Env::from_json_object(&json!([1])).unwrap_err(), HostError::NotAnObject("array"));
        let err = Env::from_json_object(&json!("x")).unwrap_err();
        assert_eq!(err.to_string(), "environment json must be an object, got string");
    }
}
