//! String-shaped rules: string, secret, boolean and enum.

use regex::Regex;
use serde_json::Value;

use super::{expect_str, render, type_name};
use crate::errors::{ValidationError, ValidationResult};
use crate::rules::{EnumRule, SecretRule, StringRule};

/// Accepted boolean spellings, matched after trimming and lower-casing.
const BOOLEAN_TOKENS: &[(&str, bool)] = &[
    ("true", true),
    ("1", true),
    ("yes", true),
    ("y", true),
    ("on", true),
    ("enabled", true),
    ("false", false),
    ("0", false),
    ("no", false),
    ("n", false),
    ("off", false),
    ("disabled", false),
];

pub(super) fn coerce_string(options: &StringRule, raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a string")?;
    let value = if options.trim { s.trim() } else { s };

    if let Some(pattern) = &options.pattern {
        let re = Regex::new(pattern).map_err(|e| {
            ValidationError::invalid_rule(path, format!("invalid regex pattern {}: {}", pattern, e))
        })?;
        if !re.is_match(value) {
            return Err(ValidationError::pattern(path, pattern, value));
        }
    }

    let length = value.chars().count();
    if let Some(min) = options.min_length {
        if length < min {
            return Err(ValidationError::min_length(path, min, length));
        }
    }
    if let Some(max) = options.max_length {
        if length > max {
            return Err(ValidationError::max_length(path, max, length));
        }
    }

    Ok(Value::String(value.to_string()))
}

pub(super) fn coerce_boolean(raw: &Value, path: &str) -> ValidationResult<Value> {
    match raw {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => {
            let token = s.trim().to_lowercase();
            BOOLEAN_TOKENS
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, value)| Value::Bool(*value))
                .ok_or_else(|| {
                    ValidationError::type_mismatch(path, "a boolean", &render(raw)).with_expected(
                        BOOLEAN_TOKENS
                            .iter()
                            .map(|(name, _)| *name)
                            .collect::<Vec<_>>()
                            .join(" | "),
                    )
                })
        }
        other => Err(ValidationError::type_mismatch(path, "a boolean", type_name(other))),
    }
}

/// Exact match first; a string may also name a non-string choice by its
/// JSON rendering (`"3"` selects the choice `3`).
pub(super) fn coerce_enum(options: &EnumRule, raw: &Value, path: &str) -> ValidationResult<Value> {
    if let Some(choice) = options.choices.iter().find(|choice| *choice == raw) {
        return Ok(choice.clone());
    }

    if let Value::String(s) = raw {
        if let Some(choice) = options
            .choices
            .iter()
            .find(|choice| !choice.is_string() && choice.to_string() == *s)
        {
            return Ok(choice.clone());
        }
    }

    let allowed: Vec<String> = options.choices.iter().map(render).collect();
    Err(ValidationError::invalid_enum(path, &allowed, &render(raw)))
}

/// Character classes counted by the secret rule.
fn character_classes(value: &str) -> usize {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut symbol = false;

    for c in value.chars() {
        if c.is_lowercase() {
            lower = true;
        } else if c.is_uppercase() {
            upper = true;
        } else if c.is_ascii_digit() {
            digit = true;
        } else if !c.is_whitespace() {
            symbol = true;
        }
    }

    [lower, upper, digit, symbol].iter().filter(|present| **present).count()
}

/// Like the string rule, but the value never appears in an error.
pub(super) fn coerce_secret(options: &SecretRule, raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a secret string")?;
    let length = s.chars().count();

    if let Some(min) = options.min_length {
        if length < min {
            return Err(ValidationError::min_length(path, min, length));
        }
    }
    if let Some(max) = options.max_length {
        if length > max {
            return Err(ValidationError::max_length(path, max, length));
        }
    }
    if let Some(min_classes) = options.min_classes {
        let found = character_classes(s);
        if found < min_classes {
            return Err(ValidationError::format(
                path,
                "secret",
                format!(
                    "secret uses {} of the character classes lowercase, uppercase, digit, symbol; at least {} required",
                    found, min_classes
                ),
            )
            .with_rule("minClasses")
            .with_actual(found.to_string()));
        }
    }

    Ok(Value::String(s.to_string()))
}
