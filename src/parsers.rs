//! Value parsers and the registry that maps semantic types to them.
//!
//! A [`ValueParser`] is stateful: the binder creates a fresh one per flag and
//! feeds it every occurrence of that flag in order. Scalar parsers keep the
//! last occurrence; list parsers append. The parsed result leaves the parser
//! as a `serde_json::Value`, which is what gets written into the
//! configuration tree.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::FlagfigError;
use crate::meta::SemanticType;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseValueError(String);

impl ParseValueError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<serde_json::Error> for ParseValueError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

/// Converts between command-line text and typed values for one flag.
pub trait ValueParser {
    /// Consume the text of one flag occurrence.
    fn parse_text(&mut self, text: &str) -> Result<(), ParseValueError>;

    /// The value parsed so far.
    fn current_value(&self) -> Result<Value, ParseValueError>;

    /// Replace the held value with an already-typed one.
    fn set_value(&mut self, value: Value) -> Result<(), ParseValueError>;

    /// Render the held value as text that [`parse_text`](Self::parse_text)
    /// accepts.
    fn format(&self) -> String;

    /// Whether the flag may appear bare, meaning `true`.
    fn is_bool_flag(&self) -> bool {
        false
    }
}

/// Creates fresh parser instances for one semantic type.
#[derive(Clone)]
pub struct ParserFactory(Arc<dyn Fn() -> Box<dyn ValueParser> + Send + Sync>);

impl ParserFactory {
    pub fn new<F>(create: F) -> Self
    where
        F: Fn() -> Box<dyn ValueParser> + Send + Sync + 'static,
    {
        Self(Arc::new(create))
    }

    /// Factory for a parser type that starts from its `Default`.
    pub fn of<P: ValueParser + Default + 'static>() -> Self {
        Self::new(|| Box::new(P::default()))
    }

    pub fn create(&self) -> Box<dyn ValueParser> {
        (self.0)()
    }
}

impl fmt::Debug for ParserFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParserFactory")
    }
}

/// What to do when a registration targets a type that already has a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverridePolicy {
    /// The later registration wins.
    #[default]
    Replace,
    /// The collision is a [`FlagfigError::DuplicateParser`].
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<SemanticType, ParserFactory>,
}

impl ParserRegistry {
    /// An empty registry, for collecting custom parsers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in parser.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SemanticType::Bool, ParserFactory::of::<Scalar<bool>>());
        registry.register(SemanticType::I32, ParserFactory::of::<Scalar<i32>>());
        registry.register(SemanticType::I64, ParserFactory::of::<Scalar<i64>>());
        registry.register(SemanticType::U32, ParserFactory::of::<Scalar<u32>>());
        registry.register(SemanticType::U64, ParserFactory::of::<Scalar<u64>>());
        registry.register(SemanticType::F64, ParserFactory::of::<Scalar<f64>>());
        registry.register(SemanticType::String, ParserFactory::of::<Scalar<String>>());
        registry.register(SemanticType::Duration, ParserFactory::of::<Scalar<Duration>>());
        registry.register(SemanticType::Timestamp, ParserFactory::of::<Scalar<DateTime<Utc>>>());
        registry.register(SemanticType::StringList, ParserFactory::of::<StringList>());
        registry
    }

    /// Register a parser, returning the one it replaced.
    pub fn register(
        &mut self,
        semantic: SemanticType,
        factory: ParserFactory,
    ) -> Option<ParserFactory> {
        self.parsers.insert(semantic, factory)
    }

    /// Register a parser unless the type already has one.
    pub fn try_register(
        &mut self,
        semantic: SemanticType,
        factory: ParserFactory,
    ) -> Result<(), FlagfigError> {
        if self.parsers.contains_key(&semantic) {
            return Err(FlagfigError::DuplicateParser(semantic));
        }
        self.parsers.insert(semantic, factory);
        Ok(())
    }

    pub fn get(&self, semantic: &SemanticType) -> Option<&ParserFactory> {
        self.parsers.get(semantic)
    }

    /// A fresh parser for `semantic`, if one is registered.
    pub fn create(&self, semantic: &SemanticType) -> Option<Box<dyn ValueParser>> {
        self.get(semantic).map(ParserFactory::create)
    }

    pub fn contains(&self, semantic: &SemanticType) -> bool {
        self.parsers.contains_key(semantic)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SemanticType, &ParserFactory)> {
        self.parsers.iter()
    }
}

/// Built-in parsers overlaid with the caller's `custom` ones.
///
/// `custom` is only read; the returned registry is a new value owned by the
/// current load.
pub fn load_parsers(
    custom: &ParserRegistry,
    policy: OverridePolicy,
) -> Result<ParserRegistry, FlagfigError> {
    let mut parsers = ParserRegistry::with_builtins();
    for (semantic, factory) in custom.iter() {
        match policy {
            OverridePolicy::Replace => {
                parsers.register(*semantic, factory.clone());
            }
            OverridePolicy::Reject => parsers.try_register(*semantic, factory.clone())?,
        }
    }
    Ok(parsers)
}

// --- Scalar parsers ---

/// A value with a command-line text form.
pub trait TextValue: Serialize + DeserializeOwned + Sized {
    fn from_text(text: &str) -> Result<Self, ParseValueError>;
    fn to_text(&self) -> String;

    const BOOL_FLAG: bool = false;
}

/// Parser for any [`TextValue`]. Each occurrence replaces the previous one.
pub struct Scalar<T> {
    value: Option<T>,
}

impl<T> Default for Scalar<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: TextValue> ValueParser for Scalar<T> {
    fn parse_text(&mut self, text: &str) -> Result<(), ParseValueError> {
        self.value = Some(T::from_text(text)?);
        Ok(())
    }

    fn current_value(&self) -> Result<Value, ParseValueError> {
        match &self.value {
            Some(value) => serde_json::to_value(value).map_err(ParseValueError::from),
            None => Ok(Value::Null),
        }
    }

    fn set_value(&mut self, value: Value) -> Result<(), ParseValueError> {
        self.value = Some(serde_json::from_value(value)?);
        Ok(())
    }

    fn format(&self) -> String {
        self.value.as_ref().map(T::to_text).unwrap_or_default()
    }

    fn is_bool_flag(&self) -> bool {
        T::BOOL_FLAG
    }
}

impl TextValue for bool {
    const BOOL_FLAG: bool = true;

    fn from_text(text: &str) -> Result<Self, ParseValueError> {
        match text {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(ParseValueError::new(format!("'{text}' is not a boolean"))),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

/// Split an optional sign and `0x`/`0o`/`0b` prefix off an integer literal.
fn radix_parts(text: &str) -> (bool, u32, &str) {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let lower = rest.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (negative, 16, &rest[2..]),
        Some("0o") => (negative, 8, &rest[2..]),
        Some("0b") => (negative, 2, &rest[2..]),
        _ => (negative, 10, rest),
    }
}

macro_rules! signed_text_value {
    ($($ty:ty),*) => {$(
        impl TextValue for $ty {
            fn from_text(text: &str) -> Result<Self, ParseValueError> {
                let (negative, radix, digits) = radix_parts(text);
                let literal = if negative { format!("-{digits}") } else { digits.to_string() };
                <$ty>::from_str_radix(&literal, radix)
                    .map_err(|e| ParseValueError::new(format!("'{text}': {e}")))
            }

            fn to_text(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

macro_rules! unsigned_text_value {
    ($($ty:ty),*) => {$(
        impl TextValue for $ty {
            fn from_text(text: &str) -> Result<Self, ParseValueError> {
                let (negative, radix, digits) = radix_parts(text);
                if negative {
                    return Err(ParseValueError::new(format!("'{text}': value must not be negative")));
                }
                <$ty>::from_str_radix(digits, radix)
                    .map_err(|e| ParseValueError::new(format!("'{text}': {e}")))
            }

            fn to_text(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

signed_text_value!(i32, i64);
unsigned_text_value!(u32, u64);

impl TextValue for f64 {
    fn from_text(text: &str) -> Result<Self, ParseValueError> {
        let value: f64 = text
            .parse()
            .map_err(|e| ParseValueError::new(format!("'{text}': {e}")))?;
        if !value.is_finite() {
            return Err(ParseValueError::new(format!("'{text}': value must be finite")));
        }
        Ok(value)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl TextValue for String {
    fn from_text(text: &str) -> Result<Self, ParseValueError> {
        Ok(text.to_string())
    }

    fn to_text(&self) -> String {
        self.clone()
    }
}

impl TextValue for Duration {
    /// A bare integer counts seconds; anything else uses humantime syntax
    /// such as `9ms`, `1h30m` or `1s 500ms`.
    fn from_text(text: &str) -> Result<Self, ParseValueError> {
        if let Ok(secs) = text.parse::<u64>() {
            return Ok(Duration::from_secs(secs));
        }
        humantime::parse_duration(text).map_err(|e| ParseValueError::new(format!("'{text}': {e}")))
    }

    fn to_text(&self) -> String {
        if self.is_zero() {
            return "0s".to_string();
        }
        humantime::format_duration(*self).to_string()
    }
}

impl TextValue for DateTime<Utc> {
    /// Any RFC 3339 timestamp, e.g. `2016-04-20T17:39:00Z` or
    /// `2016-04-20T17:39:00+02:00`. Held in UTC.
    fn from_text(text: &str) -> Result<Self, ParseValueError> {
        DateTime::parse_from_rfc3339(text)
            .map(|time| time.with_timezone(&Utc))
            .map_err(|e| ParseValueError::new(format!("'{text}': {e}")))
    }

    fn to_text(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Parser for a list of strings. Each occurrence is split on `,` and `;`
/// and appended.
#[derive(Debug, Default)]
pub struct StringList {
    items: Vec<String>,
}

impl ValueParser for StringList {
    fn parse_text(&mut self, text: &str) -> Result<(), ParseValueError> {
        self.items.extend(
            text.split([',', ';'])
                .filter(|item| !item.is_empty())
                .map(str::to_string),
        );
        Ok(())
    }

    fn current_value(&self) -> Result<Value, ParseValueError> {
        Ok(Value::from(self.items.clone()))
    }

    fn set_value(&mut self, value: Value) -> Result<(), ParseValueError> {
        self.items = serde_json::from_value(value)?;
        Ok(())
    }

    fn format(&self) -> String {
        self.items.join(",")
    }
}
