//! Rule model: the closed vocabulary of value rules.
//!
//! A [`Rule`] is pure data. It pairs a [`RuleKind`] (one variant per rule
//! type, each carrying only its own options) with the options every rule
//! shares: `required` and `defaultValue`. Composite kinds (`array`, `list`)
//! own a boxed item rule, so nesting depth is unbounded.
//!
//! Rules serialize to the camelCase schema-file form:
//!
//! ```yaml
//! REQUEST_TIMEOUT:
//!   type: duration
//!   minMs: 1000
//!   defaultValue: 1.5h
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A rule for one variable (or one nested item).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(flatten)]
    pub kind: RuleKind,

    /// Missing values fail unless this is `false` or a default is declared.
    #[serde(default = "default_true")]
    pub required: bool,

    /// Fallback used when the raw value is missing; coerced like a raw value.
    #[serde(default, alias = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl Rule {
    /// Wrap a kind with the default common options (required, no default).
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            required: true,
            default_value: None,
        }
    }

    /// Schema-file tag of this rule.
    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }
}

impl From<RuleKind> for Rule {
    fn from(kind: RuleKind) -> Self {
        Rule::new(kind)
    }
}

fn default_true() -> bool {
    true
}

/// Every rule type understood by the coercion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleKind {
    String(StringRule),
    Number(NumberRule),
    Int(NumberRule),
    Float(NumberRule),
    Boolean,
    Enum(EnumRule),
    Json(JsonRule),
    Array(ArrayRule),
    List(ListRule),
    Duration(DurationRule),
    Bytes(BytesRule),
    Path(PathRule),
    Base64(Base64Rule),
    Secret(SecretRule),
    Email,
    Port,
    Url,
    Host,
    Uuid(UuidRule),
    IpAddress(IpAddressRule),
    Hash(HashRule),
    Hexadecimal,
}

impl RuleKind {
    /// All schema-file tags, in declaration order.
    pub const TAGS: &'static [&'static str] = &[
        "string",
        "number",
        "int",
        "float",
        "boolean",
        "enum",
        "json",
        "array",
        "list",
        "duration",
        "bytes",
        "path",
        "base64",
        "secret",
        "email",
        "port",
        "url",
        "host",
        "uuid",
        "ipAddress",
        "hash",
        "hexadecimal",
    ];

    /// Schema-file tag of this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            RuleKind::String(_) => "string",
            RuleKind::Number(_) => "number",
            RuleKind::Int(_) => "int",
            RuleKind::Float(_) => "float",
            RuleKind::Boolean => "boolean",
            RuleKind::Enum(_) => "enum",
            RuleKind::Json(_) => "json",
            RuleKind::Array(_) => "array",
            RuleKind::List(_) => "list",
            RuleKind::Duration(_) => "duration",
            RuleKind::Bytes(_) => "bytes",
            RuleKind::Path(_) => "path",
            RuleKind::Base64(_) => "base64",
            RuleKind::Secret(_) => "secret",
            RuleKind::Email => "email",
            RuleKind::Port => "port",
            RuleKind::Url => "url",
            RuleKind::Host => "host",
            RuleKind::Uuid(_) => "uuid",
            RuleKind::IpAddress(_) => "ipAddress",
            RuleKind::Hash(_) => "hash",
            RuleKind::Hexadecimal => "hexadecimal",
        }
    }

    /// Whether resolved values of this kind must be redacted in output.
    /// Composites holding secret items count as secret.
    pub fn is_secret(&self) -> bool {
        match self {
            RuleKind::Secret(_) => true,
            RuleKind::Array(options) => options.item_type.kind.is_secret(),
            RuleKind::List(options) => options.item_type.kind.is_secret(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StringRule {
    /// Trim surrounding whitespace before validating.
    pub trim: bool,
    /// Regular expression the value must match (unanchored).
    pub pattern: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// Which of the three numeric rules a [`NumberRule`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFlavor {
    /// Integral results are emitted as JSON integers
    Number,
    /// Result must be a mathematical integer
    Int,
    /// Result is always emitted as a JSON float
    Float,
}

/// Options shared by the `number`, `int` and `float` rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberRule {
    pub positive: bool,
    pub negative: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Inclusive `[low, high]` bounds, checked independently of `min`/`max`.
    pub range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumRule {
    pub choices: Vec<Value>,
}

/// `json` rule; an optional custom parser replaces `serde_json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRule {
    #[serde(skip)]
    pub parser: Option<JsonParser>,
}

/// Caller-supplied text parser for the `json` rule.
#[derive(Clone)]
pub struct JsonParser(Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>);

impl JsonParser {
    pub fn new<F>(parse: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self(Arc::new(parse))
    }

    pub fn parse(&self, input: &str) -> Result<Value, String> {
        (self.0)(input)
    }
}

impl fmt::Debug for JsonParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonParser(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayRule {
    pub item_type: Box<Rule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRule {
    pub item_type: Box<Rule>,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Trim each item before coercing it.
    #[serde(default = "default_true")]
    pub trim: bool,
    /// Reject lists whose coerced items repeat.
    #[serde(default)]
    pub unique: bool,
}

fn default_separator() -> String {
    ",".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DurationRule {
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BytesRule {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathType {
    File,
    Dir,
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathType::File => f.write_str("file"),
            PathType::Dir => f.write_str("directory"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathRule {
    /// Require the path to exist.
    pub exists: bool,
    /// Require an existing path to be a file or a directory.
    pub path_type: Option<PathType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Base64Alphabet {
    #[default]
    Standard,
    UrlSafe,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Base64Padding {
    Required,
    #[default]
    Optional,
    Forbidden,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Base64Rule {
    pub alphabet: Base64Alphabet,
    pub padding: Base64Padding,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecretRule {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Minimum number of character classes (lowercase, uppercase, digit, symbol).
    pub min_classes: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UuidVersion {
    #[default]
    Any,
    V4,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UuidRule {
    pub version: UuidVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IpVersion {
    V4,
    V6,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpAddressRule {
    pub version: Option<IpVersion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "md5", alias = "MD5")]
    Md5,
    #[serde(rename = "sha1", alias = "SHA1")]
    Sha1,
    #[serde(rename = "sha256", alias = "SHA256")]
    Sha256,
    #[serde(rename = "sha384", alias = "SHA384")]
    Sha384,
    #[serde(rename = "sha512", alias = "SHA512")]
    Sha512,
}

impl HashAlgorithm {
    /// Hex digest length for the algorithm.
    pub const fn expected_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha384 => 96,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashRule {
    pub algorithm: HashAlgorithm,
}
