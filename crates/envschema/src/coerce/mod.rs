//! Coercion engine.
//!
//! [`Coercer::coerce`] turns one raw value into a validated, typed
//! [`serde_json::Value`] according to a [`Rule`]. Dispatch is an exhaustive
//! match on [`RuleKind`]; composite rules (`array`, `list`) re-enter the
//! engine for every item with an index-qualified path (`KEY[3]`).
//!
//! Raw input is a `Value` rather than a bare string: environment values
//! arrive as `Value::String`, but defaults, JSON array elements and
//! already-typed output may be numbers, booleans or arrays.

mod composite;
mod formats;
mod numeric;
mod paths;
mod text;

use serde_json::Value;

use crate::errors::{ValidationError, ValidationResult};
use crate::probe::{FsProbe, StdFs};
use crate::rules::{NumberFlavor, Rule, RuleKind};

/// Coerce `raw` with `rule`, probing the real filesystem for `path` rules.
pub fn coerce(rule: &Rule, raw: &Value, path: &str) -> ValidationResult<Value> {
    Coercer::new(&StdFs).coerce(rule, raw, path)
}

/// Rule interpreter bound to a filesystem probe.
pub struct Coercer<'p> {
    probe: &'p dyn FsProbe,
}

impl<'p> Coercer<'p> {
    pub fn new(probe: &'p dyn FsProbe) -> Self {
        Self { probe }
    }

    pub fn coerce(&self, rule: &Rule, raw: &Value, path: &str) -> ValidationResult<Value> {
        match &rule.kind {
            RuleKind::String(options) => text::coerce_string(options, raw, path),
            RuleKind::Number(options) => {
                numeric::coerce_number(options, NumberFlavor::Number, raw, path)
            }
            RuleKind::Int(options) => numeric::coerce_number(options, NumberFlavor::Int, raw, path),
            RuleKind::Float(options) => {
                numeric::coerce_number(options, NumberFlavor::Float, raw, path)
            }
            RuleKind::Boolean => text::coerce_boolean(raw, path),
            RuleKind::Enum(options) => text::coerce_enum(options, raw, path),
            RuleKind::Json(options) => composite::coerce_json(options, raw, path),
            RuleKind::Array(options) => composite::coerce_array(self, options, raw, path),
            RuleKind::List(options) => composite::coerce_list(self, options, raw, path),
            RuleKind::Duration(options) => numeric::coerce_duration(options, raw, path),
            RuleKind::Bytes(options) => numeric::coerce_bytes(options, raw, path),
            RuleKind::Path(options) => paths::coerce_path(self.probe, options, raw, path),
            RuleKind::Base64(options) => formats::coerce_base64(options, raw, path),
            RuleKind::Secret(options) => text::coerce_secret(options, raw, path),
            RuleKind::Email => formats::coerce_email(raw, path),
            RuleKind::Port => numeric::coerce_port(raw, path),
            RuleKind::Url => formats::coerce_url(raw, path),
            RuleKind::Host => formats::coerce_host(raw, path),
            RuleKind::Uuid(options) => formats::coerce_uuid(options, raw, path),
            RuleKind::IpAddress(options) => formats::coerce_ip_address(options, raw, path),
            RuleKind::Hash(options) => formats::coerce_hash(options, raw, path),
            RuleKind::Hexadecimal => formats::coerce_hexadecimal(raw, path),
        }
    }
}

/// Path of item `index` under `path`.
pub(crate) fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

/// JSON type name of a value, for mismatch messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact rendering of a value for error messages (strings are quoted).
pub(crate) fn render(value: &Value) -> String {
    value.to_string()
}

/// Borrow the string inside `raw` or fail with a type mismatch.
pub(crate) fn expect_str<'v>(raw: &'v Value, path: &str, expected: &str) -> ValidationResult<&'v str> {
    match raw {
        Value::String(s) => Ok(s),
        other => Err(ValidationError::type_mismatch(path, expected, type_name(other))),
    }
}

/// Integral floats become JSON integers so `"7"` and `7` coerce identically.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        float_value(n)
    }
}

pub(crate) fn float_value(n: f64) -> Value {
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}
