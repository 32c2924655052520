//! Symbol environment contract and an in-memory implementation.

use crate::error::{EvalError, EvalResult};
use ember_core::Value;
use std::collections::HashMap;

/// Name resolution and mutation, as consumed by the assignment family.
///
/// One environment belongs to one script instance; nothing here locks.
pub trait Environment {
    /// Fails with `UndefinedSymbol` when `name` is not bound.
    fn get(&self, name: &str) -> EvalResult<Value>;

    /// Define `name` if absent, otherwise overwrite it.
    fn set(&mut self, name: &str, value: Value);

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }
}

/// Flat `HashMap`-backed environment.
#[derive(Debug, Default, Clone)]
pub struct Env {
    bindings: HashMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for seeding inputs: `Env::new().with("a", Value::Int(2))`.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

impl Environment for Env {
    fn get(&self, name: &str) -> EvalResult<Value> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedSymbol(name.to_string()))
    }

    fn set(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
