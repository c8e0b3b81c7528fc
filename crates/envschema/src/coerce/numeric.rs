//! Numeric rules: number/int/float, port, duration and byte sizes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{float_value, number_value, render, type_name};
use crate::errors::{ValidationError, ValidationResult};
use crate::rules::{BytesRule, DurationRule, NumberFlavor, NumberRule};

/// Milliseconds per duration unit.
const DURATION_UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("s", 1_000.0),
    ("m", 60_000.0),
    ("h", 3_600_000.0),
];

/// Bytes per size unit; `*ib` units are binary.
const BYTE_UNITS: &[(&str, f64)] = &[
    ("b", 1.0),
    ("kb", 1e3),
    ("mb", 1e6),
    ("gb", 1e9),
    ("tb", 1e12),
    ("kib", 1024.0),
    ("mib", 1_048_576.0),
    ("gib", 1_073_741_824.0),
    ("tib", 1_099_511_627_776.0),
];

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?(?:\d+(?:\.\d*)?|\.\d+))(ms|s|m|h)?$").expect("duration pattern compiles")
});

static BYTES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(-?(?:\d+(?:\.\d*)?|\.\d+))\s*(b|kb|mb|gb|tb|kib|mib|gib|tib)?$")
        .expect("byte size pattern compiles")
});

/// Largest distance from an integer still treated as a whole byte count.
const WHOLE_EPSILON: f64 = 1e-6;

/// 2^64; byte counts must stay below it to fit a `u64`.
const MAX_BYTES_EXCLUSIVE: f64 = 18_446_744_073_709_551_616.0;

/// Read a finite number from a JSON number or a numeric string.
///
/// Blank strings are rejected rather than read as zero.
fn parse_number(raw: &Value, path: &str, expected: &str) -> ValidationResult<f64> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => {
            return Err(ValidationError::type_mismatch(
                path,
                expected,
                type_name(other),
            ))
        }
    };

    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::type_mismatch(path, expected, &render(raw)))
}

pub(super) fn coerce_number(
    options: &NumberRule,
    flavor: NumberFlavor,
    raw: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let n = parse_number(raw, path, "a number")?;

    if flavor == NumberFlavor::Int && n.fract() != 0.0 {
        return Err(ValidationError::type_mismatch(path, "an integer", &render(raw)));
    }
    if options.positive && n <= 0.0 {
        return Err(ValidationError::range(path, "positive", format!("value {} must be positive", n))
            .with_expected("> 0")
            .with_actual(n.to_string()));
    }
    if options.negative && n >= 0.0 {
        return Err(ValidationError::range(path, "negative", format!("value {} must be negative", n))
            .with_expected("< 0")
            .with_actual(n.to_string()));
    }
    if let Some(min) = options.min {
        if n < min {
            return Err(ValidationError::minimum(path, "min", min, n));
        }
    }
    if let Some(max) = options.max {
        if n > max {
            return Err(ValidationError::maximum(path, "max", max, n));
        }
    }
    if let Some((low, high)) = options.range {
        if n < low || n > high {
            return Err(ValidationError::range(
                path,
                "range",
                format!("value {} is outside range [{}, {}]", n, low, high),
            )
            .with_expected(format!("[{}, {}]", low, high))
            .with_actual(n.to_string()));
        }
    }

    Ok(match flavor {
        NumberFlavor::Float => float_value(n),
        NumberFlavor::Number | NumberFlavor::Int => number_value(n),
    })
}

pub(super) fn coerce_port(raw: &Value, path: &str) -> ValidationResult<Value> {
    let n = parse_number(raw, path, "a port number")?;

    if n.fract() != 0.0 {
        return Err(ValidationError::type_mismatch(path, "an integer port", &render(raw)));
    }
    if !(1.0..=65535.0).contains(&n) {
        return Err(ValidationError::range(
            path,
            "port",
            format!("port {} is outside range [1, 65535]", n),
        )
        .with_expected("[1, 65535]")
        .with_actual(n.to_string()));
    }

    Ok(number_value(n))
}

/// Split `<number><unit>` text using `re`, returning the scaled value.
fn scale_with_unit(
    re: &Regex,
    units: &[(&str, f64)],
    default_unit: &str,
    text: &str,
) -> Option<f64> {
    let caps = re.captures(text)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps
        .get(2)
        .map_or_else(|| default_unit.to_string(), |m| m.as_str().to_ascii_lowercase());
    let factor = units
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)?;
    Some(amount * factor)
}

pub(super) fn coerce_duration(
    options: &DurationRule,
    raw: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let ms = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => scale_with_unit(&DURATION_RE, DURATION_UNITS, "ms", s.trim()),
        other => {
            return Err(ValidationError::type_mismatch(
                path,
                "a duration",
                type_name(other),
            ))
        }
    }
    .filter(|ms| ms.is_finite())
    .ok_or_else(|| {
        ValidationError::parse_failure(path, "duration", render(raw))
            .with_expected("<number>[ms|s|m|h]")
            .with_actual(render(raw))
    })?;

    if let Some(min) = options.min_ms {
        if ms < min {
            return Err(ValidationError::minimum(path, "minMs", min, ms));
        }
    }
    if let Some(max) = options.max_ms {
        if ms > max {
            return Err(ValidationError::maximum(path, "maxMs", max, ms));
        }
    }

    Ok(number_value(ms))
}

pub(super) fn coerce_bytes(options: &BytesRule, raw: &Value, path: &str) -> ValidationResult<Value> {
    let size = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => scale_with_unit(&BYTES_RE, BYTE_UNITS, "b", s.trim()),
        other => {
            return Err(ValidationError::type_mismatch(
                path,
                "a byte size",
                type_name(other),
            ))
        }
    }
    .filter(|size| size.is_finite())
    .ok_or_else(|| {
        ValidationError::parse_failure(path, "byte size", render(raw))
            .with_expected("<number>[b|kb|mb|gb|tb|kib|mib|gib|tib]")
            .with_actual(render(raw))
    })?;

    let whole = size.round();
    if (size - whole).abs() > WHOLE_EPSILON {
        return Err(ValidationError::parse_failure(
            path,
            "byte size",
            format!("{} is not a whole number of bytes", render(raw)),
        ));
    }
    if whole < 0.0 {
        return Err(ValidationError::range(
            path,
            "nonNegative",
            format!("byte size {} must not be negative", whole),
        ));
    }
    if whole >= MAX_BYTES_EXCLUSIVE {
        return Err(ValidationError::range(
            path,
            "maxBytes",
            format!("byte size {} does not fit in 64 bits", whole),
        )
        .with_expected(format!("< {}", MAX_BYTES_EXCLUSIVE))
        .with_actual(whole.to_string()));
    }
    if let Some(min) = options.min {
        if whole < min as f64 {
            return Err(ValidationError::minimum(path, "min", min as f64, whole));
        }
    }
    if let Some(max) = options.max {
        if whole > max as f64 {
            return Err(ValidationError::maximum(path, "max", max as f64, whole));
        }
    }

    Ok(Value::from(whole as u64))
}
