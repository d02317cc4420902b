//! Parameter coercion: CLI tokens or a JSON document into a typed parameter set.
//!
//! Flat mode pairs tokens positionally (`key value key value ...`), expands
//! dot-notation keys into nested structures and then coerces each scalar leaf:
//! a value made only of decimal digits becomes an integer, `true`/`false` (any
//! case) become booleans, everything else stays a string. Digits with a leading
//! zero (`012345678901`) stay strings so identifiers reach the service intact.
//!
//! JSON mode takes one document verbatim, from the argument or from stdin, and
//! applies neither coercion nor dot-notation expansion.

pub mod dot_notation;

use serde_json::Value;
use std::io::Read;
use tracing::debug;

use crate::{Error, Result};

pub use dot_notation::{expand, flatten, scalar_to_string, ListStyle};

/// Token meaning "read the JSON document from stdin".
pub const STDIN_SENTINEL: &str = "-";

/// Structural problems in dot-notation keys or JSON input.
#[derive(Debug, thiserror::Error)]
pub enum CoercionError {
    #[error("empty path segment in key '{key}'")]
    EmptySegment { key: String },

    #[error("'{path}' is used both as a value and as a container")]
    Conflict { path: String },

    #[error("invalid sequence index in '{path}'")]
    InvalidIndex { path: String },

    #[error("indices under '{path}' must run 1..=n without gaps, got {indices:?}")]
    SparseIndex { path: String, indices: Vec<usize> },

    #[error("malformed JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON input must be an object of named parameters, got {found}")]
    NotAnObject { found: &'static str },

    #[error("parameter '{field}' must be an integer, got '{value}'")]
    NotAnInteger { field: String, value: String },
}

/// Raw parameter input as it arrives from the command line.
#[derive(Debug, Clone, Copy)]
pub enum ParameterInput<'a> {
    /// Alternating key/value tokens.
    Flat(&'a [String]),
    /// Zero tokens or `-` read stdin; one token is a literal document.
    Json(&'a [String]),
}

/// Converts raw CLI parameters into a typed, nested parameter set.
#[derive(Debug, Clone)]
pub struct ParameterCoercer {
    generic: bool,
    integer_fields: &'static [&'static str],
}

impl Default for ParameterCoercer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterCoercer {
    pub fn new() -> Self {
        Self {
            generic: true,
            integer_fields: &[],
        }
    }

    /// Disable the digits/boolean rule; field overrides still apply.
    pub fn without_generic_coercion(mut self) -> Self {
        self.generic = false;
        self
    }

    /// Top-level fields always converted to integers in flat mode.
    pub fn with_integer_fields(mut self, fields: &'static [&'static str]) -> Self {
        self.integer_fields = fields;
        self
    }

    /// Build the typed parameter set. `stdin` is only read in JSON mode.
    pub fn coerce<R: Read>(&self, input: ParameterInput<'_>, stdin: R) -> Result<Value> {
        match input {
            ParameterInput::Flat(tokens) => self.coerce_flat(tokens),
            ParameterInput::Json(tokens) => read_json(tokens, stdin),
        }
    }

    pub fn coerce_flat(&self, tokens: &[String]) -> Result<Value> {
        let pairs = pair_tokens(tokens)?;
        let mut value = expand(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string()))),
        )?;
        if self.generic {
            value = coerce_leaves(value);
        }
        if let Value::Object(map) = &mut value {
            for field in self.integer_fields {
                if let Some(slot) = map.get_mut(*field) {
                    *slot = force_integer(field, slot)?;
                }
            }
        }
        debug!(parameters = %value, "coerced flat parameters");
        Ok(value)
    }
}

/// Pair positional tokens; an unpaired trailing key is rejected.
pub fn pair_tokens(tokens: &[String]) -> Result<Vec<(&str, &str)>> {
    tokens
        .chunks(2)
        .map(|chunk| match chunk {
            [key, value] => Ok((key.as_str(), value.as_str())),
            [key] => Err(Error::InvalidArguments(format!(
                "parameter '{}' has no value; parameters must be given as key/value pairs",
                key
            ))),
            _ => Err(Error::InvalidArguments("empty parameter chunk".into())),
        })
        .collect()
}

/// Read a JSON parameter document from the argument or stdin.
pub fn read_json<R: Read>(tokens: &[String], mut stdin: R) -> Result<Value> {
    let text = match tokens {
        [] => read_all(&mut stdin)?,
        [token] if token == STDIN_SENTINEL => read_all(&mut stdin)?,
        [token] => token.clone(),
        _ => {
            return Err(Error::InvalidArguments(format!(
                "--json accepts at most one argument, got {}",
                tokens.len()
            )))
        }
    };
    let value: Value = serde_json::from_str(&text).map_err(CoercionError::from)?;
    match value {
        Value::Object(_) => Ok(value),
        other => Err(CoercionError::NotAnObject {
            found: json_type_name(&other),
        }
        .into()),
    }
}

fn read_all<R: Read>(stdin: &mut R) -> Result<String> {
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Apply the generic rule to one value. Already-typed values pass through.
pub fn coerce_scalar(value: Value) -> Value {
    let Value::String(s) = value else {
        return value;
    };
    let leading_zero = s.len() > 1 && s.starts_with('0');
    if !s.is_empty() && !leading_zero && s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = s.parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(n) = s.parse::<u64>() {
            return Value::from(n);
        }
    } else if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    } else if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(s)
}

/// Apply [`coerce_scalar`] to every leaf of a nested value.
pub fn coerce_leaves(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_leaves(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_leaves).collect()),
        scalar => coerce_scalar(scalar),
    }
}

fn force_integer(field: &str, value: &Value) -> std::result::Result<Value, CoercionError> {
    let not_an_integer = || CoercionError::NotAnInteger {
        field: field.to_string(),
        value: scalar_to_string(value),
    };
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| not_an_integer()),
        _ => Err(not_an_integer()),
    }
}
