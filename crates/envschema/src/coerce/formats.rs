//! Specialized string formats: base64, email, url, host, uuid, ip address,
//! hash digests and hexadecimal.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::expect_str;
use crate::errors::{ValidationError, ValidationResult};
use crate::rules::{
    Base64Alphabet, Base64Padding, Base64Rule, HashRule, IpAddressRule, IpVersion, UuidRule,
    UuidVersion,
};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("host pattern compiles")
});

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern compiles")
});

static UUID_V4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid v4 pattern compiles")
});

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]+$").expect("hex pattern compiles"));

/// One compiled base64 grammar per alphabet/padding combination.
static BASE64_PATTERNS: Lazy<HashMap<(Base64Alphabet, Base64Padding), Regex>> = Lazy::new(|| {
    let mut patterns = HashMap::new();
    for alphabet in [Base64Alphabet::Standard, Base64Alphabet::UrlSafe] {
        for padding in [
            Base64Padding::Required,
            Base64Padding::Optional,
            Base64Padding::Forbidden,
        ] {
            let re = Regex::new(&base64_pattern(alphabet, padding))
                .expect("base64 pattern compiles");
            patterns.insert((alphabet, padding), re);
        }
    }
    patterns
});

const MAX_HOST_LENGTH: usize = 253;

/// Full-string grammar: groups of four characters, then an optional short
/// final group whose `=` padding follows the padding mode.
fn base64_pattern(alphabet: Base64Alphabet, padding: Base64Padding) -> String {
    let c = match alphabet {
        Base64Alphabet::Standard => "[A-Za-z0-9+/]",
        Base64Alphabet::UrlSafe => "[A-Za-z0-9_-]",
    };
    let tail = match padding {
        Base64Padding::Required => format!("(?:{c}{{2}}==|{c}{{3}}=)?"),
        Base64Padding::Optional => format!("(?:{c}{{2}}(?:==)?|{c}{{3}}=?)?"),
        Base64Padding::Forbidden => format!("(?:{c}{{2,3}})?"),
    };
    format!("^(?:{c}{{4}})*{tail}$")
}

pub(super) fn coerce_base64(options: &Base64Rule, raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a base64 string")?;
    let valid = !s.is_empty()
        && BASE64_PATTERNS
            .get(&(options.alphabet, options.padding))
            .is_some_and(|re| re.is_match(s));

    if !valid {
        let alphabet = match options.alphabet {
            Base64Alphabet::Standard => "standard",
            Base64Alphabet::UrlSafe => "url-safe",
        };
        let padding = match options.padding {
            Base64Padding::Required => "required",
            Base64Padding::Optional => "optional",
            Base64Padding::Forbidden => "forbidden",
        };
        return Err(ValidationError::format(
            path,
            "base64",
            format!(
                "expected {} base64 with {} padding, got {:?}",
                alphabet, padding, s
            ),
        )
        .with_actual(s));
    }

    Ok(Value::String(s.to_string()))
}

pub(super) fn coerce_email(raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "an email address")?;
    if !EMAIL_RE.is_match(s) {
        return Err(ValidationError::format(
            path,
            "email",
            format!("expected an email address, got {:?}", s),
        )
        .with_actual(s));
    }
    Ok(Value::String(s.to_string()))
}

pub(super) fn coerce_url(raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a URL")?;
    if let Err(e) = url::Url::parse(s) {
        return Err(ValidationError::format(
            path,
            "url",
            format!("expected a URL, got {:?}: {}", s, e),
        )
        .with_actual(s));
    }
    Ok(Value::String(s.to_string()))
}

pub(super) fn coerce_host(raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a hostname")?;
    let valid = s == "localhost" || (s.len() <= MAX_HOST_LENGTH && HOST_RE.is_match(s));
    if !valid {
        return Err(ValidationError::format(
            path,
            "host",
            format!("expected a hostname, got {:?}", s),
        )
        .with_actual(s));
    }
    Ok(Value::String(s.to_string()))
}

pub(super) fn coerce_uuid(options: &UuidRule, raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a UUID")?;
    let (re, expected) = match options.version {
        UuidVersion::Any => (&*UUID_RE, "a UUID"),
        UuidVersion::V4 => (&*UUID_V4_RE, "a version 4 UUID"),
    };
    if !re.is_match(s) {
        return Err(ValidationError::format(
            path,
            "uuid",
            format!("expected {}, got {:?}", expected, s),
        )
        .with_actual(s));
    }
    Ok(Value::String(s.to_string()))
}

pub(super) fn coerce_ip_address(
    options: &IpAddressRule,
    raw: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "an IP address")?;

    let (pinned_ok, expected) = match options.version {
        Some(IpVersion::V4) => (s.parse::<Ipv4Addr>().is_ok(), "an IPv4 address"),
        Some(IpVersion::V6) => (s.parse::<Ipv6Addr>().is_ok(), "an IPv6 address"),
        None => (true, "an IP address"),
    };

    if !pinned_ok || s.parse::<IpAddr>().is_err() {
        return Err(ValidationError::format(
            path,
            "ipAddress",
            format!("expected {}, got {:?}", expected, s),
        )
        .with_actual(s));
    }
    Ok(Value::String(s.to_string()))
}

pub(super) fn coerce_hash(options: &HashRule, raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a hex digest")?;
    let expected_len = options.algorithm.expected_len();

    if !HEX_RE.is_match(s) {
        return Err(ValidationError::format(
            path,
            "hexadecimal",
            format!("expected a hexadecimal {} digest, got {:?}", options.algorithm, s),
        )
        .with_rule("hexadecimal")
        .with_actual(s));
    }
    if s.len() != expected_len {
        return Err(ValidationError::format(
            path,
            "hash",
            format!(
                "expected {} hexadecimal characters for {}, got {}",
                expected_len,
                options.algorithm,
                s.len()
            ),
        )
        .with_rule("hashLength")
        .with_expected(expected_len.to_string())
        .with_actual(s.len().to_string()));
    }
    Ok(Value::String(s.to_string()))
}

pub(super) fn coerce_hexadecimal(raw: &Value, path: &str) -> ValidationResult<Value> {
    let s = expect_str(raw, path, "a hexadecimal string")?;
    if !HEX_RE.is_match(s) {
        return Err(ValidationError::format(
            path,
            "hexadecimal",
            format!("expected hexadecimal characters, got {:?}", s),
        )
        .with_actual(s));
    }
    Ok(Value::String(s.to_string()))
}
