//! envschema
//!
//! Schema-driven validation and coercion of environment variables.
//!
//! A [`Schema`] maps variable names to [`Rule`]s. Resolving it against a
//! [`Source`] (the process environment, a `.env` file, a plain map) coerces
//! every raw string into a typed [`serde_json::Value`] or fails with the first
//! [`ValidationError`], whose path locates the offending value down to list
//! and array items (`ALLOWED_PORTS[2]`).
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use envschema::schema::{self, RuleExt};
//! use envschema::{Env, Schema};
//!
//! let schema = Schema::new()
//!     .rule("PORT", schema::port().default_value(8080))
//!     .rule("TIMEOUT", schema::duration().min_ms(1000.0))
//!     .rule("FEATURES", schema::list(schema::string()).unique());
//!
//! let source: HashMap<String, String> = [
//!     ("TIMEOUT".to_string(), "1.5h".to_string()),
//!     ("FEATURES".to_string(), "search, export".to_string()),
//! ]
//! .into_iter()
//! .collect();
//!
//! let env = Env::from_source(&schema, &source)?;
//! assert_eq!(env.get_u64("PORT")?, Some(8080));
//! assert_eq!(env.get_u64("TIMEOUT")?, Some(5_400_000));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Schemas can also be loaded from YAML or JSON files with
//! [`Schema::from_file`].

pub mod coerce;
mod env;
mod errors;
pub mod probe;
mod resolve;
pub mod rules;
pub mod schema;
mod schema_file;
pub mod source;

pub use coerce::{coerce, Coercer};
pub use env::{Env, REDACTED};
pub use errors::{EnvError, ErrorKind, SchemaError, ValidationError, ValidationResult};
pub use probe::{FsProbe, PathStat, StdFs};
pub use resolve::{ResolveOptions, Resolver, Schema, UnknownKeys};
pub use rules::{Rule, RuleKind};
pub use schema_file::SchemaFormat;
pub use source::{load_dotenv, Layered, ProcessEnv, Source};
