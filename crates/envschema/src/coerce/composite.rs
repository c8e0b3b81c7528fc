//! JSON documents and the recursive `array` and `list` rules.

use serde_json::Value;

use super::{index_path, render, type_name, Coercer};
use crate::errors::{ValidationError, ValidationResult};
use crate::rules::{ArrayRule, JsonRule, ListRule, Rule};

pub(super) fn coerce_json(options: &JsonRule, raw: &Value, path: &str) -> ValidationResult<Value> {
    let Value::String(text) = raw else {
        return Ok(raw.clone());
    };

    match &options.parser {
        Some(parser) => parser
            .parse(text)
            .map_err(|e| ValidationError::parse_failure(path, "JSON", e)),
        None => serde_json::from_str(text)
            .map_err(|e| ValidationError::parse_failure(path, "JSON", e)),
    }
}

/// Coerce every item in order, stopping at the first failure.
fn coerce_items(
    coercer: &Coercer<'_>,
    item_rule: &Rule,
    items: &[Value],
    path: &str,
) -> ValidationResult<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item_path = index_path(path, index);
            tracing::trace!("Coercing {} as {}", item_path, item_rule.tag());
            coercer.coerce(item_rule, item, &item_path)
        })
        .collect()
}

/// Accepts a JSON array literal or an array; blank text is an empty array.
pub(super) fn coerce_array(
    coercer: &Coercer<'_>,
    options: &ArrayRule,
    raw: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let parsed;
    let items: &[Value] = match raw {
        Value::Array(items) => items,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            if !text.starts_with('[') {
                return Err(ValidationError::parse_failure(
                    path,
                    "array literal",
                    format!("expected a JSON array starting with '[', got {}", render(raw)),
                ));
            }
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|e| ValidationError::parse_failure(path, "array literal", e))?;
            match &parsed {
                Value::Array(items) => items,
                other => {
                    return Err(ValidationError::type_mismatch(
                        path,
                        "an array",
                        type_name(other),
                    ))
                }
            }
        }
        other => {
            return Err(ValidationError::type_mismatch(
                path,
                "an array",
                type_name(other),
            ))
        }
    };

    coerce_items(coercer, &options.item_type, items, path).map(Value::Array)
}

/// Accepts delimited text or an array. Uniqueness is checked on the coerced
/// items, after every item has passed its own rule.
pub(super) fn coerce_list(
    coercer: &Coercer<'_>,
    options: &ListRule,
    raw: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let items: Vec<Value> = match raw {
        Value::Array(items) => items.clone(),
        Value::String(text) => {
            if options.separator.is_empty() {
                return Err(ValidationError::invalid_rule(
                    path,
                    "list separator must not be empty",
                )
                .with_rule("separator"));
            }
            text.split(options.separator.as_str())
                .map(|item| if options.trim { item.trim() } else { item })
                .map(|item| Value::String(item.to_string()))
                .collect()
        }
        other => {
            return Err(ValidationError::type_mismatch(
                path,
                "a delimited list",
                type_name(other),
            ))
        }
    };

    let coerced = coerce_items(coercer, &options.item_type, &items, path)?;

    if options.unique {
        for (index, value) in coerced.iter().enumerate() {
            if let Some(first) = coerced[..index].iter().position(|seen| seen == value) {
                let rendered = if options.item_type.kind.is_secret() {
                    "<redacted>".to_string()
                } else {
                    render(value)
                };
                return Err(ValidationError::duplicate(
                    index_path(path, index),
                    &rendered,
                    first,
                ));
            }
        }
    }

    Ok(Value::Array(coerced))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::probe::StdFs;
    use crate::rules::JsonParser;
    use crate::schema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn coercer() -> Coercer<'static> {
        Coercer::new(&StdFs)
    }

    #[test]
    fn test_json_parses_strings_and_passes_values() -> Result<(), ValidationError> {
        let rule = JsonRule::default();
        assert_eq!(
            coerce_json(&rule, &json!(r#"{"a": [1, 2]}"#), "J")?,
            json!({ "a": [1, 2] })
        );
        assert_eq!(coerce_json(&rule, &json!({ "b": true }), "J")?, json!({ "b": true }));
        Ok(())
    }

    #[test]
    fn test_json_wraps_parser_message() {
        let err = coerce_json(&JsonRule::default(), &json!("{oops"), "J").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseFailure);
        assert!(err.message.starts_with("invalid JSON: key must be a string"));
    }

    #[test]
    fn test_json_custom_parser() -> Result<(), ValidationError> {
        let rule = schema::json().parser(JsonParser::new(|text| {
            serde_yaml::from_str(text).map_err(|e| e.to_string())
        }));
        assert_eq!(
            coerce_json(&rule, &json!("a: 1\nb: [x, y]"), "J")?,
            json!({ "a": 1, "b": ["x", "y"] })
        );

        let failing = schema::json().parser(JsonParser::new(|_| Err("nope".to_string())));
        let err = coerce_json(&failing, &json!("{}"), "J").unwrap_err();
        assert_eq!(err.message, "invalid JSON: nope");
        Ok(())
    }

    #[test]
    fn test_array_literal() -> Result<(), ValidationError> {
        let rule = schema::array(schema::int());
        assert_eq!(
            coerce_array(&coercer(), &rule, &json!("[1, \"2\", 3]"), "A")?,
            json!([1, 2, 3])
        );
        assert_eq!(coerce_array(&coercer(), &rule, &json!("  "), "A")?, json!([]));
        Ok(())
    }

    #[test]
    fn test_array_requires_bracket_and_array_result() {
        let rule = schema::array(schema::string());
        let err = coerce_array(&coercer(), &rule, &json!("a,b"), "A").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseFailure);
        let err = coerce_array(&coercer(), &rule, &json!("[1,"), "A").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseFailure);
        let err = coerce_array(&coercer(), &rule, &json!(5), "A").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_array_item_errors_carry_index() {
        let rule = schema::array(schema::array(schema::int()));
        let err = coerce_array(&coercer(), &rule, &json!("[[1, 2], [3, 4.5]]"), "MATRIX")
            .unwrap_err();
        assert_eq!(err.path, "MATRIX[1][1]");
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_list_split_and_trim() -> Result<(), ValidationError> {
        let rule = schema::list(schema::string());
        assert_eq!(
            coerce_list(&coercer(), &rule, &json!("a, b ,c"), "L")?,
            json!(["a", "b", "c"])
        );

        let untrimmed = schema::list(schema::string()).no_trim().separator(";");
        assert_eq!(
            coerce_list(&coercer(), &untrimmed, &json!("a; b"), "L")?,
            json!(["a", " b"])
        );
        Ok(())
    }

    #[test]
    fn test_list_empty_string_is_one_empty_item() -> Result<(), ValidationError> {
        let rule = schema::list(schema::string());
        assert_eq!(coerce_list(&coercer(), &rule, &json!(""), "L")?, json!([""]));

        let ints = schema::list(schema::int());
        let err = coerce_list(&coercer(), &ints, &json!(""), "L").unwrap_err();
        assert_eq!(err.path, "L[0]");
        Ok(())
    }

    #[test]
    fn test_list_item_errors_carry_index() {
        let rule = schema::list(schema::port());
        let err = coerce_list(&coercer(), &rule, &json!("80,443,http"), "PORTS").unwrap_err();
        assert_eq!(err.path, "PORTS[2]");
    }

    #[test]
    fn test_list_unique_on_coerced_values() {
        let rule = schema::list(schema::int()).unique();
        let err = coerce_list(&coercer(), &rule, &json!("1, 2, 01"), "IDS").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UniquenessViolation);
        assert_eq!(err.path, "IDS[2]");
        assert!(err.message.contains("first seen at index 0"));
    }

    #[test]
    fn test_list_type_error_reported_before_duplicate() {
        let rule = schema::list(schema::int()).unique();
        let err = coerce_list(&coercer(), &rule, &json!("x,x"), "IDS").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.path, "IDS[0]");
    }

    #[test]
    fn test_list_empty_separator_is_rule_error() {
        let rule = schema::list(schema::string()).separator("");
        let err = coerce_list(&coercer(), &rule, &json!("abc"), "L").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRule);
    }

    #[test]
    fn test_list_accepts_arrays() -> Result<(), ValidationError> {
        let rule = schema::list(schema::boolean());
        assert_eq!(
            coerce_list(&coercer(), &rule, &json!(["yes", false]), "L")?,
            json!([true, false])
        );
        Ok(())
    }
}
