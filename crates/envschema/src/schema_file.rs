//! Loading schemas from YAML or JSON documents.
//!
//! A schema document maps variable names to rule objects in camelCase:
//!
//! ```yaml
//! REQUEST_TIMEOUT:
//!   type: duration
//!   minMs: 1000
//!   defaultValue: 1.5h
//! ALLOWED_PORTS:
//!   type: list
//!   unique: true
//!   itemType:
//!     type: port
//! ```
//!
//! Every `type` tag, including nested `itemType` tags, is checked against the
//! rule vocabulary before the document is deserialized, so an unknown tag is
//! reported as [`ErrorKind::UnsupportedRule`](crate::ErrorKind) with the key
//! that declared it.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::{SchemaError, ValidationError};
use crate::resolve::Schema;
use crate::rules::{Rule, RuleKind};

/// Document syntax of a schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
}

impl SchemaFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Json,
            _ => SchemaFormat::Yaml,
        }
    }
}

impl Schema {
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_yaml::from_str(text)?;
        Self::from_document(document)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    pub fn from_str_with_format(text: &str, format: SchemaFormat) -> Result<Self, SchemaError> {
        match format {
            SchemaFormat::Yaml => Self::from_yaml_str(text),
            SchemaFormat::Json => Self::from_json_str(text),
        }
    }

    /// Read a schema file, picking the syntax from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let format = SchemaFormat::from_path(path);
        tracing::debug!("Loading {:?} schema from {}", format, path.display());
        Self::from_str_with_format(&text, format)
    }

    fn from_document(document: Value) -> Result<Self, SchemaError> {
        let Value::Object(entries) = document else {
            return Err(SchemaError::NotAMapping);
        };

        let mut schema = Schema::new();
        for (key, rule) in entries {
            check_tags(&rule, &key)?;
            let rule: Rule = serde_json::from_value(rule)
                .map_err(|e| ValidationError::invalid_rule(key.as_str(), e.to_string()))?;
            schema.insert(key, rule);
        }

        tracing::debug!("Loaded schema with {} variables", schema.len());
        Ok(schema)
    }
}

/// Verify the `type` tag of `rule` and of every nested item rule.
fn check_tags(rule: &Value, path: &str) -> Result<(), ValidationError> {
    let Value::Object(fields) = rule else {
        return Err(ValidationError::invalid_rule(path, "rule must be a mapping"));
    };

    let tag = match fields.get("type") {
        Some(Value::String(tag)) => tag,
        Some(_) => {
            return Err(ValidationError::invalid_rule(path, "rule `type` must be a string")
                .with_rule("type"))
        }
        None => {
            return Err(ValidationError::invalid_rule(path, "rule is missing `type`")
                .with_rule("type"))
        }
    };

    if !RuleKind::TAGS.contains(&tag.as_str()) {
        return Err(ValidationError::unsupported_rule(path, tag)
            .with_expected(RuleKind::TAGS.join(" | ")));
    }

    match fields.get("itemType") {
        Some(item) => check_tags(item, &format!("{}[]", path)),
        None => Ok(()),
    }
}
