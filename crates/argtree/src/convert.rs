//! Type converters.
//!
//! A [`Registry`] maps a value type tag (`"int"`, `"path"`, ...) to a
//! [`Converter`]. Converters are plain function values, so registering a new
//! type is a closure rather than a new trait impl.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub const STRING: &str = "string";
pub const INT: &str = "int";
pub const FLOAT: &str = "float";
pub const BOOL: &str = "bool";
pub const PATH: &str = "path";
pub const KEY_VALUE: &str = "key-value";
/// Number of times a switch was given.
pub const COUNT: &str = "count";

/// A converted argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    Pair(String, String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&str, &str)> {
        match self {
            Self::Pair(k, v) => Some((k, v)),
            _ => None,
        }
    }

    /// Short name of the variant, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Path(_) => "path",
            Self::Pair(..) => "pair",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            // `{:?}` keeps a trailing `.0` so the text reads back as a float.
            Self::Float(n) => write!(f, "{n:?}"),
            Self::Str(s) => f.write_str(s),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Pair(k, v) => write!(f, "{k}={v}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConversionError {
    message: String,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type ParseFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;

/// A parse function plus the metadata the resolver needs about it.
#[derive(Clone)]
pub struct Converter {
    parse: Arc<ParseFn>,
    numeric: bool,
    counter: bool,
    implicit: Option<Value>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("numeric", &self.numeric)
            .field("counter", &self.counter)
            .field("implicit", &self.implicit)
            .finish_non_exhaustive()
    }
}

impl Converter {
    pub fn new<F>(parse: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self {
            parse: Arc::new(parse),
            numeric: false,
            counter: false,
            implicit: None,
        }
    }

    /// Mark the converter as accepting negative numbers, so `-5` is read as a
    /// value rather than an unknown flag in commands that use it.
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    /// The value of an argument using this converter is the number of times
    /// it was given, as [`Value::Int`]. The parse function still handles
    /// defaults.
    pub fn counter(mut self) -> Self {
        self.counter = true;
        self
    }

    /// Value used when the argument is present but received no values.
    pub fn implicit(mut self, value: Value) -> Self {
        self.implicit = Some(value);
        self
    }

    pub fn parse(&self, raw: &str) -> Result<Value, ConversionError> {
        (self.parse)(raw)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    pub fn is_counter(&self) -> bool {
        self.counter
    }

    pub fn implicit_value(&self) -> Option<&Value> {
        self.implicit.as_ref()
    }
}

/// Type tag to converter map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    converters: HashMap<String, Converter>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with `string`, `int`, `float`, `bool`, `path`, `key-value`
    /// and `count`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(STRING, Converter::new(|raw| Ok(Value::Str(raw.to_string()))));
        registry.register(INT, Converter::new(parse_int).numeric());
        registry.register(FLOAT, Converter::new(parse_float).numeric());
        registry.register(BOOL, Converter::new(parse_bool).implicit(Value::Bool(true)));
        registry.register(PATH, Converter::new(parse_path));
        registry.register(KEY_VALUE, Converter::new(parse_key_value));
        registry.register(COUNT, Converter::new(parse_count).counter());
        registry
    }

    /// Register `converter` under `tag`, replacing any previous one.
    pub fn register(&mut self, tag: impl Into<String>, converter: Converter) -> &mut Self {
        self.converters.insert(tag.into(), converter);
        self
    }

    pub fn with(mut self, tag: impl Into<String>, converter: Converter) -> Self {
        self.register(tag, converter);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&Converter> {
        self.converters.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.converters.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    /// Convert `raw` with the converter registered under `tag`.
    pub fn convert(&self, tag: &str, raw: &str) -> Result<Value, ConversionError> {
        match self.get(tag) {
            Some(converter) => converter.parse(raw),
            None => Err(ConversionError::new(format!("unknown value type '{tag}'"))),
        }
    }
}

fn parse_int(raw: &str) -> Result<Value, ConversionError> {
    raw.trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|e| ConversionError::new(format!("expected an integer: {e}")))
}

fn parse_count(raw: &str) -> Result<Value, ConversionError> {
    raw.trim()
        .parse::<u32>()
        .map(|n| Value::Int(i64::from(n)))
        .map_err(|e| ConversionError::new(format!("expected a count: {e}")))
}

fn parse_float(raw: &str) -> Result<Value, ConversionError> {
    let n = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| ConversionError::new(format!("expected a number: {e}")))?;
    if !n.is_finite() {
        return Err(ConversionError::new("expected a finite number"));
    }
    Ok(Value::Float(n))
}

fn parse_bool(raw: &str) -> Result<Value, ConversionError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "0" => Ok(Value::Bool(false)),
        _ => Err(ConversionError::new(
            "expected one of: true, false, yes, no, 1, 0",
        )),
    }
}

fn parse_path(raw: &str) -> Result<Value, ConversionError> {
    if raw.is_empty() {
        return Err(ConversionError::new("path cannot be empty"));
    }
    Ok(Value::Path(PathBuf::from(raw)))
}

fn parse_key_value(raw: &str) -> Result<Value, ConversionError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => {
            Ok(Value::Pair(key.to_string(), value.to_string()))
        }
        Some(_) => Err(ConversionError::new("key cannot be empty")),
        None => Err(ConversionError::new("expected KEY=VALUE")),
    }
}

/// Integers within `min..=max`.
pub fn int_range(min: i64, max: i64) -> Converter {
    Converter::new(move |raw| {
        let value = parse_int(raw)?;
        match value {
            Value::Int(n) if n < min || n > max => Err(ConversionError::new(format!(
                "{n} is out of range {min}..={max}"
            ))),
            other => Ok(other),
        }
    })
    .numeric()
}

/// Strings restricted to `values`.
pub fn one_of<I, S>(values: I) -> Converter
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = values.into_iter().map(Into::into).collect();
    Converter::new(move |raw| {
        if allowed.iter().any(|v| v == raw) {
            Ok(Value::Str(raw.to_string()))
        } else {
            Err(ConversionError::new(format!(
                "possible values: {}",
                allowed.join(", ")
            )))
        }
    })
}
