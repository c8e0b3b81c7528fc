//! Library interface for the envschema CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use envschema::{
    load_dotenv, Layered, ProcessEnv, ResolveOptions, Resolver, Rule, RuleKind, Schema,
    UnknownKeys, REDACTED,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "envschema")]
#[command(about = "Validate environment variables against a declarative schema", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a schema and print the validated values
    Check(CheckArgs),

    /// List the variables a schema declares
    Describe {
        /// Schema file (YAML or JSON)
        #[arg(short, long, env = "ENVSCHEMA_SCHEMA")]
        schema: PathBuf,
    },
}

#[derive(Args)]
pub struct CheckArgs {
    /// Schema file (YAML or JSON)
    #[arg(short, long, env = "ENVSCHEMA_SCHEMA")]
    pub schema: PathBuf,

    /// .env file layered below the process environment
    #[arg(short, long, env = "ENVSCHEMA_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Ignore the process environment
    #[arg(long)]
    pub no_process_env: bool,

    /// Keep undeclared variables in the output
    #[arg(long)]
    pub passthrough: bool,

    /// Print secret values instead of a placeholder
    #[arg(long)]
    pub show_secrets: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Execute a subcommand and return what it prints.
pub fn run(command: &Commands) -> Result<String> {
    match command {
        Commands::Check(args) => run_check(args),
        Commands::Describe { schema } => run_describe(schema),
    }
}

fn load_schema(path: &Path) -> Result<Schema> {
    Schema::from_file(path).with_context(|| format!("Failed to load schema {}", path.display()))
}

/// Resolve the schema against the process environment layered over the
/// optional `.env` file. The process environment wins.
pub fn run_check(args: &CheckArgs) -> Result<String> {
    let schema = load_schema(&args.schema)?;
    info!(
        "Checking {} variables from {}",
        schema.len(),
        args.schema.display()
    );

    let mut source = Layered::new();
    if !args.no_process_env {
        source = source.with_layer(ProcessEnv);
    }
    if let Some(env_file) = &args.env_file {
        let values = load_dotenv(env_file)
            .with_context(|| format!("Failed to read env file {}", env_file.display()))?;
        source = source.with_layer(values);
    }
    debug!("Resolving against {} source layers", source.len());

    let options = ResolveOptions {
        unknown_keys: if args.passthrough {
            UnknownKeys::Passthrough
        } else {
            UnknownKeys::Ignore
        },
    };
    let env = Resolver::new(&schema)
        .with_options(options)
        .resolve(&source)
        .context("Environment does not satisfy the schema")?;

    info!("✓ {} variables resolved", env.len());
    let values = if args.show_secrets {
        env.into_values()
    } else {
        env.redacted()
    };
    render(&values, args.format)
}

fn render(values: &IndexMap<String, Value>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(values).context("Failed to render JSON output")
        }
        OutputFormat::Yaml => serde_yaml::to_string(values)
            .map(|yaml| yaml.trim_end().to_string())
            .context("Failed to render YAML output"),
    }
}

/// One line per declared variable: name, rule, required/optional, default.
pub fn run_describe(schema_path: &Path) -> Result<String> {
    let schema = load_schema(schema_path)?;
    let rows: Vec<(&str, String, &Rule)> = schema
        .iter()
        .map(|(key, rule)| (key.as_str(), describe_rule(rule), rule))
        .collect();
    let key_width = rows.iter().map(|(key, _, _)| key.len()).max().unwrap_or(0);
    let rule_width = rows.iter().map(|(_, tag, _)| tag.len()).max().unwrap_or(0);

    let lines: Vec<String> = rows
        .iter()
        .map(|(key, tag, rule)| {
            let presence = if rule.required { "required" } else { "optional" };
            let default = match &rule.default_value {
                Some(_) if rule.kind.is_secret() => format!("default={}", REDACTED),
                Some(value) => format!("default={}", value),
                None => String::new(),
            };
            format!(
                "{:<key_width$}  {:<rule_width$}  {}  {}",
                key,
                tag,
                presence,
                default,
                key_width = key_width,
                rule_width = rule_width
            )
            .trim_end()
            .to_string()
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Rule tag, with item rules spelled out for composites (`list<port>`).
fn describe_rule(rule: &Rule) -> String {
    match &rule.kind {
        RuleKind::Array(options) => format!("array<{}>", describe_rule(&options.item_type)),
        RuleKind::List(options) => format!("list<{}>", describe_rule(&options.item_type)),
        _ => rule.tag().to_string(),
    }
}
