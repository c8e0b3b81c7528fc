//! Resolution driver: applies a [`Schema`] to a [`Source`].

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::coerce::Coercer;
use crate::env::Env;
use crate::errors::{ValidationError, ValidationResult};
use crate::probe::{FsProbe, StdFs};
use crate::rules::Rule;
use crate::source::Source;

/// Ordered mapping of variable names to rules.
///
/// Declaration order is resolution order, so it also decides which error is
/// reported first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    rules: IndexMap<String, Rule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `key`, replacing any earlier rule for it in place.
    pub fn rule(mut self, key: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.insert(key, rule);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, rule: impl Into<Rule>) -> Option<Rule> {
        self.rules.insert(key.into(), rule.into())
    }

    pub fn get(&self, key: &str) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Rule> {
        self.rules.iter()
    }
}

impl<K: Into<String>, R: Into<Rule>> FromIterator<(K, R)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (key, rule) in iter {
            schema.insert(key, rule);
        }
        schema
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = (&'a String, &'a Rule);
    type IntoIter = indexmap::map::Iter<'a, String, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// What to do with source keys the schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Leave them out of the result
    #[default]
    Ignore,
    /// Store them verbatim as strings, without validation
    Passthrough,
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub unknown_keys: UnknownKeys,
}

/// Resolves a schema against raw sources.
pub struct Resolver<'s> {
    schema: &'s Schema,
    options: ResolveOptions,
    probe: &'s dyn FsProbe,
}

impl<'s> Resolver<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            options: ResolveOptions::default(),
            probe: &StdFs,
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `probe` instead of the real filesystem for `path` rules.
    pub fn with_probe(mut self, probe: &'s dyn FsProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn passthrough_unknown(mut self) -> Self {
        self.options.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    /// Resolve every declared key in order, stopping at the first error.
    ///
    /// An empty string counts as missing. Missing values fall back to the
    /// rule's default, which is coerced exactly like a raw value.
    pub fn resolve<S: Source + ?Sized>(&self, source: &S) -> ValidationResult<Env> {
        let coercer = Coercer::new(self.probe);
        let mut values = IndexMap::with_capacity(self.schema.len());
        let mut secrets = BTreeSet::new();

        for (key, rule) in self.schema {
            if rule.kind.is_secret() {
                secrets.insert(key.clone());
            }

            let raw = source.get(key).filter(|raw| !raw.is_empty());
            let value = match (raw, &rule.default_value) {
                (Some(raw), _) => {
                    debug!("Resolving {} from source as {}", key, rule.tag());
                    coercer.coerce(rule, &Value::String(raw), key)?
                }
                (None, Some(default)) => {
                    debug!("Resolving {} from default as {}", key, rule.tag());
                    coercer
                        .coerce(rule, default, key)
                        .map_err(ValidationError::in_default)?
                }
                (None, None) if rule.required => {
                    return Err(ValidationError::missing_required(key.as_str()));
                }
                (None, None) => {
                    debug!("{} is optional and absent", key);
                    continue;
                }
            };
            values.insert(key.clone(), value);
        }

        if self.options.unknown_keys == UnknownKeys::Passthrough {
            for key in source.keys() {
                if self.schema.contains_key(&key) {
                    continue;
                }
                if let Some(raw) = source.get(&key) {
                    warn!("Passing through undeclared variable {}", key);
                    values.insert(key, Value::String(raw));
                }
            }
        }

        debug!(
            "Resolved {} of {} declared variables",
            values.len(),
            self.schema.len()
        );
        Ok(Env::new(values, secrets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::probe::PathStat;
    use crate::schema::{self, RuleExt};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io;
    use std::path::Path;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_raw_values_are_coerced() -> Result<(), ValidationError> {
        let schema = Schema::new()
            .rule("PORT", schema::port())
            .rule("DEBUG", schema::boolean());
        let env = Resolver::new(&schema).resolve(&source(&[("PORT", "8080"), ("DEBUG", "on")]))?;

        assert_eq!(env.get("PORT"), Some(&json!(8080)));
        assert_eq!(env.get("DEBUG"), Some(&json!(true)));
        Ok(())
    }

    #[test]
    fn test_missing_required() {
        let schema = Schema::new().rule("DATABASE_URL", schema::url());
        let err = Resolver::new(&schema).resolve(&source(&[])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequired);
        assert_eq!(err.path, "DATABASE_URL");
    }

    #[test]
    fn test_empty_string_is_missing() {
        let schema = Schema::new().rule("NAME", schema::string());
        let err = Resolver::new(&schema)
            .resolve(&source(&[("NAME", "")]))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequired);
    }

    #[test]
    fn test_defaults_are_coerced() -> Result<(), ValidationError> {
        let schema = Schema::new()
            .rule("TIMEOUT", schema::duration().default_value("1.5h"))
            .rule("UPLOAD", schema::bytes().default_value("1KiB"));
        let env = Resolver::new(&schema).resolve(&source(&[("UPLOAD", "")]))?;

        assert_eq!(env.get("TIMEOUT"), Some(&json!(5_400_000)));
        assert_eq!(env.get("UPLOAD"), Some(&json!(1024)));
        Ok(())
    }

    #[test]
    fn test_invalid_default_is_rejected() {
        let schema = Schema::new().rule("TIMEOUT", schema::duration().default_value("soon"));
        let err = Resolver::new(&schema).resolve(&source(&[])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseFailure);
        assert!(err.message.starts_with("invalid default value: "));
    }

    #[test]
    fn test_optional_without_default_is_absent() -> Result<(), ValidationError> {
        let schema = Schema::new().rule("FEATURE", schema::boolean().optional());
        let env = Resolver::new(&schema).resolve(&source(&[]))?;
        assert!(!env.contains_key("FEATURE"));
        assert_eq!(env.get("FEATURE"), None);
        Ok(())
    }

    #[test]
    fn test_first_error_in_declaration_order() {
        let schema = Schema::new()
            .rule("B", schema::int())
            .rule("A", schema::int());
        let err = Resolver::new(&schema)
            .resolve(&source(&[("A", "x"), ("B", "y")]))
            .unwrap_err();
        assert_eq!(err.path, "B");
    }

    #[test]
    fn test_unknown_keys() -> Result<(), ValidationError> {
        let schema = Schema::new().rule("PORT", schema::port());
        let raw = source(&[("PORT", "80"), ("EXTRA", "not validated")]);

        let ignored = Resolver::new(&schema).resolve(&raw)?;
        assert_eq!(ignored.len(), 1);

        let passed = Resolver::new(&schema).passthrough_unknown().resolve(&raw)?;
        assert_eq!(passed.get("EXTRA"), Some(&json!("not validated")));
        assert_eq!(passed.get("PORT"), Some(&json!(80)));
        Ok(())
    }

    #[test]
    fn test_custom_probe() {
        struct Nothing;

        impl FsProbe for Nothing {
            fn exists(&self, _path: &Path) -> bool {
                false
            }

            fn stat(&self, _path: &Path) -> io::Result<PathStat> {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }

        let schema = Schema::new().rule("CERT", schema::path().exists());
        let err = Resolver::new(&schema)
            .with_probe(&Nothing)
            .resolve(&source(&[("CERT", "/etc/hosts")]))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExistenceViolation);
    }

    #[test]
    fn test_schema_order_and_replacement() {
        let mut schema: Schema = vec![("Z", schema::boolean()), ("A", schema::email())]
            .into_iter()
            .collect();
        let previous = schema.insert("Z", schema::port());

        assert_eq!(previous.map(|rule| rule.tag()), Some("boolean"));
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["Z", "A"]);
        assert_eq!(schema.get("Z").map(Rule::tag), Some("port"));
    }
}
