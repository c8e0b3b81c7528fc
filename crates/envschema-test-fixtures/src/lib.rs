//! Test fixtures for envschema testing
//!
//! Provides temporary directories holding the files, directories, schema
//! documents and `.env` files the path rule, schema loader and CLI tests need.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Canned schema documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFixture {
    /// A typical web service: port, host, timeouts, feature flags, secrets
    Service,
    /// Lists and arrays nesting other rules
    Nested,
    /// A rule with an unknown `type` tag
    UnknownRule,
}

impl SchemaFixture {
    pub fn file_name(&self) -> &'static str {
        match self {
            SchemaFixture::Service => "service.yaml",
            SchemaFixture::Nested => "nested.yaml",
            SchemaFixture::UnknownRule => "unknown.yaml",
        }
    }

    pub fn contents(&self) -> &'static str {
        match self {
            SchemaFixture::Service => SERVICE_SCHEMA,
            SchemaFixture::Nested => NESTED_SCHEMA,
            SchemaFixture::UnknownRule => UNKNOWN_RULE_SCHEMA,
        }
    }
}

const SERVICE_SCHEMA: &str = r#"# Service configuration
PORT:
  type: port
  defaultValue: 8080
HOST:
  type: host
  defaultValue: localhost
LOG_LEVEL:
  type: enum
  choices: [trace, debug, info, warn, error]
  defaultValue: info
REQUEST_TIMEOUT:
  type: duration
  minMs: 100
  maxMs: 60000
  defaultValue: 5s
MAX_UPLOAD:
  type: bytes
  max: 1073741824
  defaultValue: 10MiB
ENABLE_METRICS:
  type: boolean
  required: false
API_TOKEN:
  type: secret
  minLength: 12
  minClasses: 3
"#;

const NESTED_SCHEMA: &str = r#"ALLOWED_PORTS:
  type: list
  unique: true
  itemType:
    type: port
MATRIX:
  type: array
  required: false
  itemType:
    type: array
    itemType:
      type: int
"#;

const UNKNOWN_RULE_SCHEMA: &str = r#"PORT:
  type: port
SCHEDULE:
  type: list
  itemType:
    type: cron
"#;

/// A temporary directory removed when dropped
pub struct FixtureDir {
    temp_dir: tempfile::TempDir,
}

impl FixtureDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file (creating parent directories) and return its path
    pub fn file(&self, name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Create a directory and return its path
    pub fn dir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write one of the canned schema documents
    pub fn schema(&self, fixture: SchemaFixture) -> io::Result<PathBuf> {
        self.file(fixture.file_name(), fixture.contents())
    }

    /// Write a `.env` file from key/value pairs
    pub fn env_file(&self, name: &str, pairs: &[(&str, &str)]) -> io::Result<PathBuf> {
        let contents: String = pairs
            .iter()
            .map(|(key, value)| format!("{}={}\n", key, value))
            .collect();
        self.file(name, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_dir_writes_files() -> io::Result<()> {
        let fixture = FixtureDir::new()?;
        let path = fixture.file("nested/config.txt", "hello")?;
        assert_eq!(fs::read_to_string(path)?, "hello");
        assert!(fixture.dir("data")?.is_dir());
        Ok(())
    }

    #[test]
    fn test_env_file_format() -> io::Result<()> {
        let fixture = FixtureDir::new()?;
        let path = fixture.env_file(".env", &[("A", "1"), ("B", "two")])?;
        assert_eq!(fs::read_to_string(path)?, "A=1\nB=two\n");
        Ok(())
    }
}
