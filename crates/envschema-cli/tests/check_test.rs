//! Tests for the check and describe commands

use envschema::REDACTED;
use envschema_cli::{run, run_check, run_describe, CheckArgs, Commands, OutputFormat};
use envschema_test_fixtures::{FixtureDir, SchemaFixture};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn check_args(dir: &FixtureDir, pairs: &[(&str, &str)]) -> Result<CheckArgs, std::io::Error> {
    Ok(CheckArgs {
        schema: dir.schema(SchemaFixture::Service)?,
        env_file: Some(dir.env_file(".env", pairs)?),
        no_process_env: true,
        passthrough: false,
        show_secrets: false,
        format: OutputFormat::Json,
    })
}

#[test]
fn test_check_renders_redacted_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let args = check_args(&dir, &[("PORT", "9000"), ("API_TOKEN", "Correct-Horse-42")])?;

    let output: Value = serde_json::from_str(&run_check(&args)?)?;
    assert_eq!(
        output,
        json!({
            "PORT": 9000,
            "HOST": "localhost",
            "LOG_LEVEL": "info",
            "REQUEST_TIMEOUT": 5000,
            "MAX_UPLOAD": 10485760,
            "API_TOKEN": "********"
        })
    );
    Ok(())
}

#[test]
fn test_check_show_secrets_and_passthrough() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let mut args = check_args(
        &dir,
        &[("API_TOKEN", "Correct-Horse-42"), ("UNDECLARED", "kept")],
    )?;
    args.show_secrets = true;
    args.passthrough = true;

    let output: Value = serde_json::from_str(&run_check(&args)?)?;
    assert_eq!(output["API_TOKEN"], json!("Correct-Horse-42"));
    assert_eq!(output["UNDECLARED"], json!("kept"));
    Ok(())
}

#[test]
fn test_check_yaml_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let mut args = check_args(&dir, &[("API_TOKEN", "Correct-Horse-42")])?;
    args.format = OutputFormat::Yaml;

    let output = run_check(&args)?;
    assert!(output.starts_with("PORT: 8080\nHOST: localhost\n"));
    assert!(output.contains("API_TOKEN: "));
    assert!(output.contains(REDACTED));
    Ok(())
}

#[test]
fn test_check_reports_first_violation() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let args = check_args(&dir, &[("PORT", "http"), ("API_TOKEN", "weak")])?;

    let err = run_check(&args).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.starts_with("Environment does not satisfy the schema: PORT: "));
    assert!(message.ends_with("[TYPE_MISMATCH]"));
    Ok(())
}

#[test]
fn test_check_missing_schema() {
    let args = CheckArgs {
        schema: "/nonexistent/schema.yaml".into(),
        env_file: None,
        no_process_env: true,
        passthrough: false,
        show_secrets: false,
        format: OutputFormat::Json,
    };
    let err = run_check(&args).unwrap_err();
    assert!(err.to_string().starts_with("Failed to load schema"));
}

#[test]
fn test_describe() -> Result<(), Box<dyn std::error::Error>> {
    let dir = FixtureDir::new()?;
    let schema = dir.schema(SchemaFixture::Nested)?;

    let output = run(&Commands::Describe { schema })?;
    assert_eq!(
        output,
        "ALLOWED_PORTS  list<port>         required\n\
         MATRIX         array<array<int>>  optional"
    );

    let service = run_describe(&dir.schema(SchemaFixture::Service)?)?;
    let lines: Vec<&str> = service.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].starts_with("PORT"));
    assert!(lines[0].ends_with("required  default=8080"));
    assert!(lines[5].contains("optional"));
    Ok(())
}
