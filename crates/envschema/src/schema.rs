//! Rule constructors.
//!
//! Pure data builders: nothing here validates. Each function returns the
//! options struct for its rule kind, and every option struct converts into a
//! [`Rule`], so builders compose directly into a [`crate::Schema`]:
//!
//! ```rust
//! use envschema::schema::{self, RuleExt};
//! use envschema::Schema;
//!
//! let schema = Schema::new()
//!     .rule("PORT", schema::port().default_value(8080))
//!     .rule("TIMEOUT", schema::duration().min_ms(1000.0).max_ms(3_600_000.0))
//!     .rule("HOSTS", schema::list(schema::host()).unique())
//!     .rule("DEBUG", schema::boolean().optional());
//! assert_eq!(schema.len(), 4);
//! ```

use serde_json::Value;

use crate::rules::{
    ArrayRule, Base64Alphabet, Base64Padding, Base64Rule, BytesRule, DurationRule, EnumRule,
    HashAlgorithm, HashRule, IpAddressRule, IpVersion, JsonParser, JsonRule, ListRule,
    NumberFlavor, NumberRule, PathRule, PathType, Rule, RuleKind, SecretRule, StringRule, UuidRule,
    UuidVersion,
};

/// Common options available on anything that converts into a [`Rule`].
pub trait RuleExt: Into<Rule> + Sized {
    /// Allow the variable to be absent.
    fn optional(self) -> Rule {
        let mut rule = self.into();
        rule.required = false;
        rule
    }

    /// Declare a default, coerced like a raw value when the variable is missing.
    fn default_value(self, value: impl Into<Value>) -> Rule {
        let mut rule = self.into();
        rule.default_value = Some(value.into());
        rule
    }
}

impl<T: Into<Rule>> RuleExt for T {}

macro_rules! into_rule {
    ($($options:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$options> for Rule {
                fn from(options: $options) -> Self {
                    Rule::new(RuleKind::$variant(options))
                }
            }
        )*
    };
}

into_rule! {
    StringRule => String,
    EnumRule => Enum,
    JsonRule => Json,
    ArrayRule => Array,
    ListRule => List,
    DurationRule => Duration,
    BytesRule => Bytes,
    PathRule => Path,
    Base64Rule => Base64,
    SecretRule => Secret,
    UuidRule => Uuid,
    IpAddressRule => IpAddress,
    HashRule => Hash,
}

/// Builder for the `number`, `int` and `float` rules.
#[derive(Debug, Clone)]
pub struct NumberBuilder {
    flavor: NumberFlavor,
    options: NumberRule,
}

impl NumberBuilder {
    pub fn positive(mut self) -> Self {
        self.options.positive = true;
        self
    }

    pub fn negative(mut self) -> Self {
        self.options.negative = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.options.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.options.max = Some(max);
        self
    }

    pub fn range(mut self, low: f64, high: f64) -> Self {
        self.options.range = Some((low, high));
        self
    }
}

impl From<NumberBuilder> for Rule {
    fn from(builder: NumberBuilder) -> Self {
        let kind = match builder.flavor {
            NumberFlavor::Number => RuleKind::Number(builder.options),
            NumberFlavor::Int => RuleKind::Int(builder.options),
            NumberFlavor::Float => RuleKind::Float(builder.options),
        };
        Rule::new(kind)
    }
}

fn number_builder(flavor: NumberFlavor) -> NumberBuilder {
    NumberBuilder {
        flavor,
        options: NumberRule::default(),
    }
}

pub fn string() -> StringRule {
    StringRule::default()
}

impl StringRule {
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

pub fn number() -> NumberBuilder {
    number_builder(NumberFlavor::Number)
}

pub fn int() -> NumberBuilder {
    number_builder(NumberFlavor::Int)
}

pub fn float() -> NumberBuilder {
    number_builder(NumberFlavor::Float)
}

pub fn boolean() -> Rule {
    Rule::new(RuleKind::Boolean)
}

/// `enum` rule over a fixed set of choices.
pub fn enumeration<I, V>(choices: I) -> EnumRule
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    EnumRule {
        choices: choices.into_iter().map(Into::into).collect(),
    }
}

pub fn json() -> JsonRule {
    JsonRule::default()
}

impl JsonRule {
    /// Parse string input with `parser` instead of `serde_json`.
    pub fn parser(mut self, parser: JsonParser) -> Self {
        self.parser = Some(parser);
        self
    }
}

pub fn array(item_type: impl Into<Rule>) -> ArrayRule {
    ArrayRule {
        item_type: Box::new(item_type.into()),
    }
}

pub fn list(item_type: impl Into<Rule>) -> ListRule {
    ListRule {
        item_type: Box::new(item_type.into()),
        separator: ",".to_string(),
        trim: true,
        unique: false,
    }
}

impl ListRule {
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Keep surrounding whitespace on each item.
    pub fn no_trim(mut self) -> Self {
        self.trim = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

pub fn duration() -> DurationRule {
    DurationRule::default()
}

impl DurationRule {
    pub fn min_ms(mut self, min: f64) -> Self {
        self.min_ms = Some(min);
        self
    }

    pub fn max_ms(mut self, max: f64) -> Self {
        self.max_ms = Some(max);
        self
    }
}

pub fn bytes() -> BytesRule {
    BytesRule::default()
}

impl BytesRule {
    pub fn min(mut self, min: u64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: u64) -> Self {
        self.max = Some(max);
        self
    }
}

pub fn path() -> PathRule {
    PathRule::default()
}

impl PathRule {
    pub fn exists(mut self) -> Self {
        self.exists = true;
        self
    }

    pub fn file(mut self) -> Self {
        self.path_type = Some(PathType::File);
        self
    }

    pub fn dir(mut self) -> Self {
        self.path_type = Some(PathType::Dir);
        self
    }
}

pub fn base64() -> Base64Rule {
    Base64Rule::default()
}

impl Base64Rule {
    pub fn url_safe(mut self) -> Self {
        self.alphabet = Base64Alphabet::UrlSafe;
        self
    }

    pub fn padding(mut self, padding: Base64Padding) -> Self {
        self.padding = padding;
        self
    }
}

pub fn secret() -> SecretRule {
    SecretRule::default()
}

impl SecretRule {
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_classes(mut self, classes: usize) -> Self {
        self.min_classes = Some(classes);
        self
    }
}

pub fn email() -> Rule {
    Rule::new(RuleKind::Email)
}

pub fn port() -> Rule {
    Rule::new(RuleKind::Port)
}

pub fn url() -> Rule {
    Rule::new(RuleKind::Url)
}

pub fn host() -> Rule {
    Rule::new(RuleKind::Host)
}

pub fn uuid() -> UuidRule {
    UuidRule::default()
}

impl UuidRule {
    pub fn v4(mut self) -> Self {
        self.version = UuidVersion::V4;
        self
    }
}

pub fn ip_address() -> IpAddressRule {
    IpAddressRule::default()
}

impl IpAddressRule {
    pub fn v4(mut self) -> Self {
        self.version = Some(IpVersion::V4);
        self
    }

    pub fn v6(mut self) -> Self {
        self.version = Some(IpVersion::V6);
        self
    }
}

pub fn hash(algorithm: HashAlgorithm) -> HashRule {
    HashRule { algorithm }
}

pub fn hexadecimal() -> Rule {
    Rule::new(RuleKind::Hexadecimal)
}
