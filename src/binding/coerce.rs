//! Type-directed coercion of raw command-line strings
//!
//! The coercion for a parameter is inferred from its default value. Parameters
//! without a default, or defaulting to `null`, keep the raw string.

use serde_json::{Number, Value};
use std::fmt;
use thiserror::Error;

/// Tokens that coerce to `false` for boolean-defaulted parameters (case-sensitive)
pub const FALSE_TOKENS: [&str; 5] = ["0", "F", "f", "False", "false"];

/// Conversion applied to a raw command-line string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Keep the raw string
    Raw,
    /// Boolean token rule, see [`FALSE_TOKENS`]
    Bool,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// String (identity)
    Str,
    /// JSON array literal
    List,
    /// JSON object literal
    Dict,
}

/// Why a raw string could not be coerced
#[derive(Debug, Error)]
pub enum CoercionFailure {
    /// Integer parse failure
    #[error(transparent)]
    Int(#[from] std::num::ParseIntError),

    /// Float parse failure
    #[error(transparent)]
    Float(#[from] std::num::ParseFloatError),

    /// Float parsed but is not representable as a JSON number
    #[error("{0} is not a finite number")]
    NonFinite(f64),

    /// JSON literal parse failure
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// JSON parsed into a different kind than the default's
    #[error("expected a JSON {expected}, got {found}")]
    KindMismatch {
        /// Expected kind
        expected: &'static str,
        /// Kind actually parsed
        found: &'static str,
    },
}

impl Coercion {
    /// Infer the coercion implied by a default value.
    ///
    /// `None` stands for a parameter without a default.
    pub fn infer(default: Option<&Value>) -> Self {
        match default {
            None | Some(Value::Null) => Coercion::Raw,
            Some(Value::Bool(_)) => Coercion::Bool,
            Some(Value::Number(n)) if n.is_f64() => Coercion::Float,
            Some(Value::Number(_)) => Coercion::Int,
            Some(Value::String(_)) => Coercion::Str,
            Some(Value::Array(_)) => Coercion::List,
            Some(Value::Object(_)) => Coercion::Dict,
        }
    }

    /// Type name used in help text and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Coercion::Raw | Coercion::Str => "str",
            Coercion::Bool => "bool",
            Coercion::Int => "int",
            Coercion::Float => "float",
            Coercion::List => "list",
            Coercion::Dict => "dict",
        }
    }

    /// Convert a raw token
    pub fn apply(&self, raw: &str) -> Result<Value, CoercionFailure> {
        match self {
            Coercion::Raw | Coercion::Str => Ok(Value::String(raw.to_string())),
            Coercion::Bool => Ok(Value::Bool(parse_bool(raw))),
            Coercion::Int => Ok(Value::from(raw.trim().parse::<i64>()?)),
            Coercion::Float => {
                let f = raw.trim().parse::<f64>()?;
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or(CoercionFailure::NonFinite(f))
            }
            Coercion::List => parse_kind(raw, "array"),
            Coercion::Dict => parse_kind(raw, "object"),
        }
    }
}

impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Boolean token rule: anything outside [`FALSE_TOKENS`] is `true`
pub fn parse_bool(raw: &str) -> bool {
    !FALSE_TOKENS.contains(&raw)
}

fn parse_kind(raw: &str, expected: &'static str) -> Result<Value, CoercionFailure> {
    let value: Value = serde_json::from_str(raw)?;
    let found = kind_name(&value);
    if found == expected {
        Ok(value)
    } else {
        Err(CoercionFailure::KindMismatch { expected, found })
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
