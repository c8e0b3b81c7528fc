//! Schema files, .env loading and rendered error messages

use std::collections::HashMap;

use envschema::{load_dotenv, Env, Layered, Schema, SchemaError, REDACTED};
use envschema_test_fixtures::{FixtureDir, SchemaFixture};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use serde_json::json;

fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn load(fixture: SchemaFixture) -> Result<Schema, Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let path = dir.schema(fixture)?;
    Ok(Schema::from_file(path)?)
}

#[test]
fn test_service_schema_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let schema = load(SchemaFixture::Service)?;
    let env = Env::from_source(&schema, &source(&[("API_TOKEN", "Sup3rSecretValue")]))?;

    assert_eq!(env.get("PORT"), Some(&json!(8080)));
    assert_eq!(env.get_str("HOST")?, Some("localhost"));
    assert_eq!(env.get_str("LOG_LEVEL")?, Some("info"));
    assert_eq!(env.get_u64("REQUEST_TIMEOUT")?, Some(5_000));
    assert_eq!(env.get_u64("MAX_UPLOAD")?, Some(10_485_760));
    assert_eq!(env.get_bool("ENABLE_METRICS")?, None);
    assert_eq!(env.redacted().get("API_TOKEN"), Some(&json!(REDACTED)));
    Ok(())
}

#[test]
fn test_service_schema_errors() -> Result<(), Box<dyn std::error::Error>> {
    let schema = load(SchemaFixture::Service)?;
    let render = |pairs: &[(&str, &str)]| match Env::from_source(&schema, &source(pairs)) {
        Ok(_) => "resolved".to_string(),
        Err(err) => err.to_string(),
    };

    assert_snapshot!(
        render(&[]),
        @"API_TOKEN: required variable is missing [MISSING_REQUIRED]"
    );
    assert_snapshot!(
        render(&[("API_TOKEN", "short")]),
        @"API_TOKEN: length 5 is less than minimum 12 [RANGE_VIOLATION]"
    );
    assert_snapshot!(
        render(&[("API_TOKEN", "Sup3rSecretValue"), ("LOG_LEVEL", "verbose")]),
        @r#"LOG_LEVEL: invalid value "verbose", must be one of: "trace", "debug", "info", "warn", "error" [TYPE_MISMATCH]"#
    );
    assert_snapshot!(
        render(&[("API_TOKEN", "Sup3rSecretValue"), ("REQUEST_TIMEOUT", "2 minutes")]),
        @r#"REQUEST_TIMEOUT: invalid duration: "2 minutes" [PARSE_FAILURE]"#
    );
    assert_snapshot!(
        render(&[("API_TOKEN", "Sup3rSecretValue"), ("PORT", "70000")]),
        @"PORT: port 70000 is outside range [1, 65535] [RANGE_VIOLATION]"
    );
    Ok(())
}

#[test]
fn test_nested_schema() -> Result<(), Box<dyn std::error::Error>> {
    let schema = load(SchemaFixture::Nested)?;

    let env = Env::from_source(
        &schema,
        &source(&[("ALLOWED_PORTS", "80, 443"), ("MATRIX", "[[1, 2], [3]]")]),
    )?;
    assert_eq!(env.get("ALLOWED_PORTS"), Some(&json!([80, 443])));
    assert_eq!(env.get("MATRIX"), Some(&json!([[1, 2], [3]])));

    let err = Env::from_source(&schema, &source(&[("ALLOWED_PORTS", "80,443,80")]))
        .map(|_| ())
        .unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"ALLOWED_PORTS[2]: duplicate value 80 (first seen at index 0) [UNIQUENESS_VIOLATION]"
    );
    Ok(())
}

#[test]
fn test_unknown_rule_tag() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let path = dir.schema(SchemaFixture::UnknownRule)?;

    let err = Schema::from_file(path).map(|_| ()).unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"Invalid schema: SCHEDULE[]: unsupported rule type 'cron' [UNSUPPORTED_RULE]"
    );
    Ok(())
}

#[test]
fn test_missing_schema_file() {
    let err = Schema::from_file("/nonexistent/schema.yaml").map(|_| ()).unwrap_err();
    assert!(matches!(err, SchemaError::Io { .. }));
}

#[test]
fn test_json_schema_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let path = dir.file(
        "schema.json",
        r#"{"RETRIES": {"type": "int", "min": 0, "max": 10, "defaultValue": "3"}}"#,
    )?;

    let schema = Schema::from_file(path)?;
    let env = Env::from_source(&schema, &source(&[]))?;
    assert_eq!(env.get_i64("RETRIES")?, Some(3));
    Ok(())
}

#[test]
fn test_dotenv_layered_under_explicit_values() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let schema = Schema::from_file(dir.schema(SchemaFixture::Service)?)?;
    let env_file = dir.env_file(
        ".env",
        &[("PORT", "9000"), ("API_TOKEN", "FromDotEnv42x"), ("HOST", "api.internal")],
    )?;

    let layered = Layered::new()
        .with_layer(source(&[("PORT", "9100")]))
        .with_layer(load_dotenv(&env_file)?);
    let env = Env::from_source(&schema, &layered)?;

    assert_eq!(env.get_u64("PORT")?, Some(9100));
    assert_eq!(env.get_str("HOST")?, Some("api.internal"));
    assert_eq!(env.get_str("API_TOKEN")?, Some("FromDotEnv42x"));
    Ok(())
}
