//! Read-only lookup over resolved values.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{EnvError, ValidationResult};
use crate::resolve::{Resolver, Schema};
use crate::source::{ProcessEnv, Source};

/// Placeholder shown instead of secret values.
pub const REDACTED: &str = "********";

/// Validated environment.
///
/// Built once by a [`Resolver`]; every read afterwards is a plain map lookup.
/// Keys whose rule is optional, has no default and had no raw value are
/// absent, so [`Env::get`] returns `None` for them.
#[derive(Clone, PartialEq)]
pub struct Env {
    values: IndexMap<String, Value>,
    secrets: BTreeSet<String>,
}

impl Env {
    pub(crate) fn new(values: IndexMap<String, Value>, secrets: BTreeSet<String>) -> Self {
        Self { values, secrets }
    }

    /// Resolve `schema` against the process environment.
    pub fn from_process(schema: &Schema) -> ValidationResult<Self> {
        Self::from_source(schema, &ProcessEnv)
    }

    /// Resolve `schema` against any [`Source`].
    pub fn from_source<S: Source + ?Sized>(schema: &Schema, source: &S) -> ValidationResult<Self> {
        Resolver::new(schema).resolve(source)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in schema declaration order, passthrough keys last.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Whether `key` was declared with the `secret` rule, directly or as a
    /// composite item rule.
    pub fn is_secret(&self, key: &str) -> bool {
        self.secrets.contains(key)
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>, EnvError> {
        self.typed(key, "a string", Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, EnvError> {
        self.typed(key, "a boolean", Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, EnvError> {
        self.typed(key, "a signed integer", Value::as_i64)
    }

    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, EnvError> {
        self.typed(key, "an unsigned integer", Value::as_u64)
    }

    pub fn get_f64(&self, key: &str) -> Result<Option<f64>, EnvError> {
        self.typed(key, "a number", Value::as_f64)
    }

    pub fn get_array(&self, key: &str) -> Result<Option<&[Value]>, EnvError> {
        self.typed(key, "an array", |value| value.as_array().map(Vec::as_slice))
    }

    /// Deserialize the value under `key` into any owned type.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, EnvError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| self.lookup_error(key, std::any::type_name::<T>(), value)),
        }
    }

    /// All values, with secrets replaced by [`REDACTED`].
    pub fn redacted(&self) -> IndexMap<String, Value> {
        self.values
            .iter()
            .map(|(key, value)| {
                let shown = if self.is_secret(key) {
                    Value::String(REDACTED.to_string())
                } else {
                    value.clone()
                };
                (key.clone(), shown)
            })
            .collect()
    }

    /// Consume the lookup and return the raw mapping, secrets included.
    pub fn into_values(self) -> IndexMap<String, Value> {
        self.values
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &str,
        read: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, EnvError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => read(value)
                .map(Some)
                .ok_or_else(|| self.lookup_error(key, expected, value)),
        }
    }

    fn lookup_error(&self, key: &str, expected: &str, value: &Value) -> EnvError {
        let value = if self.is_secret(key) {
            REDACTED.to_string()
        } else {
            value.to_string()
        };
        EnvError::Lookup {
            key: key.to_string(),
            expected: expected.to_string(),
            value,
        }
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.redacted()).finish()
    }
}

impl<'a> IntoIterator for &'a Env {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
