//! Error types for envschema.
//!
//! Validation failures are reported as a single [`ValidationError`] carrying
//! the path of the offending value (`KEY`, `KEY[2]`, `KEY[2][0]`) so nested
//! list and array items can be located. Resolution is fail-fast: the first
//! error aborts construction and is returned as-is.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the coercion engine.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required key absent and no default declared
    MissingRequired,
    /// Raw value has a runtime type the rule cannot accept
    TypeMismatch,
    /// A textual grammar (JSON, duration, byte size, array literal) failed to parse
    ParseFailure,
    /// Numeric, length or duration value outside declared bounds
    RangeViolation,
    /// A string rule's `pattern` did not match
    PatternMismatch,
    /// A specialized string format failed (email, url, uuid, base64, ...)
    FormatViolation,
    /// A `list` rule's `unique` constraint failed
    UniquenessViolation,
    /// A `path` rule's existence, type or readability check failed
    ExistenceViolation,
    /// A schema named a rule type that does not exist
    UnsupportedRule,
    /// A rule's own options are malformed (bad regex, empty separator, ...)
    InvalidRule,
}

impl ErrorKind {
    /// Stable code used in rendered messages.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequired => "MISSING_REQUIRED",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::ParseFailure => "PARSE_FAILURE",
            ErrorKind::RangeViolation => "RANGE_VIOLATION",
            ErrorKind::PatternMismatch => "PATTERN_MISMATCH",
            ErrorKind::FormatViolation => "FORMAT_VIOLATION",
            ErrorKind::UniquenessViolation => "UNIQUENESS_VIOLATION",
            ErrorKind::ExistenceViolation => "EXISTENCE_VIOLATION",
            ErrorKind::UnsupportedRule => "UNSUPPORTED_RULE",
            ErrorKind::InvalidRule => "INVALID_RULE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single validation error with location and context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path to the value that failed validation.
    ///
    /// Examples:
    /// - `"PORT"` - a top-level variable
    /// - `"ALLOWED_HOSTS[1]"` - the second item of a list
    /// - `"MATRIX[0][2]"` - an item of a nested array
    pub path: String,

    /// Failure category.
    pub kind: ErrorKind,

    /// Human-readable error message.
    pub message: String,

    /// The rule option that was violated (if known).
    ///
    /// Examples: `"minLength"`, `"maxMs"`, `"unique"`, `"readable"`.
    pub rule: Option<String>,

    /// The expected value or constraint (if applicable).
    pub expected: Option<String>,

    /// The actual value that failed validation (never set for secrets).
    pub actual: Option<String>,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(path: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
            rule: None,
            expected: None,
            actual: None,
        }
    }

    /// Set the rule option that was violated.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Set the expected value.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Set the actual value.
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Mark the error as raised while coercing a schema-declared default.
    pub fn in_default(mut self) -> Self {
        self.message = format!("invalid default value: {}", self.message);
        self
    }

    // --- Common error constructors ---

    /// Required variable is absent and has no default.
    pub fn missing_required(path: impl Into<String>) -> Self {
        Self::new(
            path,
            ErrorKind::MissingRequired,
            "required variable is missing",
        )
        .with_rule("required")
    }

    /// Raw value has the wrong shape for the rule.
    pub fn type_mismatch(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::new(
            path,
            ErrorKind::TypeMismatch,
            format!("expected {}, got {}", expected, actual),
        )
        .with_expected(expected)
        .with_actual(actual)
    }

    /// A textual grammar failed to parse.
    pub fn parse_failure(path: impl Into<String>, what: &str, detail: impl fmt::Display) -> Self {
        Self::new(
            path,
            ErrorKind::ParseFailure,
            format!("invalid {}: {}", what, detail),
        )
        .with_expected(what)
    }

    /// Generic bound violation with a caller-provided message.
    pub fn range(path: impl Into<String>, rule: &str, message: impl Into<String>) -> Self {
        Self::new(path, ErrorKind::RangeViolation, message).with_rule(rule)
    }

    /// String shorter than `minLength`.
    pub fn min_length(path: impl Into<String>, min: usize, actual: usize) -> Self {
        Self::range(
            path,
            "minLength",
            format!("length {} is less than minimum {}", actual, min),
        )
        .with_expected(format!(">= {}", min))
        .with_actual(actual.to_string())
    }

    /// String longer than `maxLength`.
    pub fn max_length(path: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::range(
            path,
            "maxLength",
            format!("length {} exceeds maximum {}", actual, max),
        )
        .with_expected(format!("<= {}", max))
        .with_actual(actual.to_string())
    }

    /// Number below `min` (or the named lower bound).
    pub fn minimum(path: impl Into<String>, rule: &str, min: f64, actual: f64) -> Self {
        Self::range(
            path,
            rule,
            format!("value {} is less than minimum {}", actual, min),
        )
        .with_expected(format!(">= {}", min))
        .with_actual(actual.to_string())
    }

    /// Number above `max` (or the named upper bound).
    pub fn maximum(path: impl Into<String>, rule: &str, max: f64, actual: f64) -> Self {
        Self::range(
            path,
            rule,
            format!("value {} exceeds maximum {}", actual, max),
        )
        .with_expected(format!("<= {}", max))
        .with_actual(actual.to_string())
    }

    /// String rule `pattern` did not match.
    pub fn pattern(path: impl Into<String>, pattern: &str, value: &str) -> Self {
        Self::new(
            path,
            ErrorKind::PatternMismatch,
            format!("value does not match pattern: {}", pattern),
        )
        .with_rule("pattern")
        .with_expected(pattern)
        .with_actual(value)
    }

    /// Specialized string format failed.
    pub fn format(path: impl Into<String>, format_name: &str, detail: impl Into<String>) -> Self {
        Self::new(path, ErrorKind::FormatViolation, detail).with_expected(format_name)
    }

    /// Value is not one of the enum choices.
    pub fn invalid_enum(path: impl Into<String>, allowed: &[String], actual: &str) -> Self {
        Self::new(
            path,
            ErrorKind::TypeMismatch,
            format!(
                "invalid value {}, must be one of: {}",
                actual,
                allowed.join(", ")
            ),
        )
        .with_rule("choices")
        .with_expected(allowed.join(" | "))
        .with_actual(actual)
    }

    /// List contains the same coerced value twice.
    pub fn duplicate(path: impl Into<String>, value: &str, first_index: usize) -> Self {
        Self::new(
            path,
            ErrorKind::UniquenessViolation,
            format!(
                "duplicate value {} (first seen at index {})",
                value, first_index
            ),
        )
        .with_rule("unique")
        .with_actual(value)
    }

    /// Path rule existence, type or readability failure.
    pub fn existence(path: impl Into<String>, rule: &str, message: impl Into<String>) -> Self {
        Self::new(path, ErrorKind::ExistenceViolation, message).with_rule(rule)
    }

    /// Schema names a rule type that does not exist.
    pub fn unsupported_rule(path: impl Into<String>, tag: &str) -> Self {
        Self::new(
            path,
            ErrorKind::UnsupportedRule,
            format!("unsupported rule type '{}'", tag),
        )
        .with_actual(tag)
    }

    /// Rule options are themselves malformed.
    pub fn invalid_rule(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, ErrorKind::InvalidRule, message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }

        write!(f, " [{}]", self.kind)
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a schema document.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema root must be a mapping of variable names to rules")]
    NotAMapping,

    #[error("Invalid schema: {0}")]
    Rule(#[from] ValidationError),
}

/// Top-level error type.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to load env file {path}: {source}")]
    DotEnv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("{key}: stored value {value} cannot be read as {expected}")]
    Lookup {
        key: String,
        expected: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::new("PORT", ErrorKind::RangeViolation, "value must be positive")
            .with_rule("positive")
            .with_expected("> 0")
            .with_actual("-1");

        let display = format!("{}", error);
        assert!(display.contains("PORT"));
        assert!(display.contains("value must be positive"));
        assert!(display.contains("[RANGE_VIOLATION]"));
    }

    #[test]
    fn test_display_without_path() {
        let error = ValidationError::invalid_rule("", "separator must not be empty");
        assert_eq!(
            error.to_string(),
            "separator must not be empty [INVALID_RULE]"
        );
    }

    #[test]
    fn test_common_error_constructors() {
        let required = ValidationError::missing_required("DATABASE_URL");
        assert_eq!(required.kind, ErrorKind::MissingRequired);
        assert_eq!(required.rule.as_deref(), Some("required"));

        let min_len = ValidationError::min_length("NAME", 3, 1);
        assert!(min_len.message.contains('1'));
        assert!(min_len.message.contains('3'));

        let pattern = ValidationError::pattern("NAME", "^[a-z]+$", "Test123");
        assert_eq!(pattern.kind, ErrorKind::PatternMismatch);
        assert_eq!(pattern.actual.as_deref(), Some("Test123"));

        let dup = ValidationError::duplicate("TAGS[1]", "\"a\"", 0);
        assert_eq!(dup.kind, ErrorKind::UniquenessViolation);
        assert!(dup.message.contains("index 0"));
    }

    #[test]
    fn test_in_default_prefixes_message() {
        let error = ValidationError::parse_failure("TIMEOUT", "duration", "\"soon\"").in_default();
        assert!(error.message.starts_with("invalid default value: "));
        assert_eq!(error.kind, ErrorKind::ParseFailure);
    }

    #[test]
    fn test_kind_codes_are_screaming_snake() {
        assert_eq!(ErrorKind::UniquenessViolation.to_string(), "UNIQUENESS_VIOLATION");
        assert_eq!(ErrorKind::MissingRequired.code(), "MISSING_REQUIRED");
    }
}
