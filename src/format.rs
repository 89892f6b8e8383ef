//! Parameter substitution for query templates.
//!
//! Turns a raw template containing `$name` placeholders plus a JSON object
//! of named parameters into a fully-substituted query string. Substitution
//! is textual, not bound-parameter based; stored templates depend on the
//! textual semantics.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::error::FormatError;
use crate::timestamp;

/// A query parameter value, classified from its JSON representation.
///
/// Classification is determined solely by the JSON type and, for strings,
/// the fixed `now()` prefix. Anything outside this set is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A plain string literal.
    Text(String),
    /// A relative timestamp expression (string starting with `now()`).
    Timestamp(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Classifies a JSON value into a parameter value.
    ///
    /// Arrays, objects, and nulls are unsupported and fail with the
    /// offending key.
    pub fn classify(key: &str, value: &Value) -> Result<Self, FormatError> {
        match value {
            Value::String(s) if s.starts_with("now()") => Ok(Self::Timestamp(s.clone())),
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(FormatError::UnsupportedType { key: key.into() })
                }
            }
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                Err(FormatError::UnsupportedType { key: key.into() })
            }
        }
    }

    /// Renders the value as a SQL literal ready for textual insertion.
    fn to_literal(&self, key: &str, now: NaiveDateTime) -> Result<String, FormatError> {
        match self {
            Self::Timestamp(expr) => timestamp::resolve(expr, now).map_err(|source| {
                FormatError::InvalidTimestamp {
                    key: key.into(),
                    source,
                }
            }),
            // Embedded single quotes are doubled to neutralize them as
            // literal delimiters. This is not a general injection defense.
            Self::Text(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
            Self::Integer(i) => Ok(i.to_string()),
            Self::Float(f) => Ok(format!("{f:.6}")),
            Self::Bool(b) => Ok(b.to_string()),
        }
    }
}

/// Substitutes every parameter into the template.
///
/// For each `(key, value)` the token `$key` is replaced everywhere it
/// occurs. Placeholders with no corresponding parameter pass through
/// untouched; parameters never referenced by the template are no-ops.
///
/// Limitation: parameter names must not be prefixes of one another (e.g.
/// `t` and `ts`). Replacement order across keys is unspecified, so a
/// shorter key can clobber part of a longer placeholder. Existing stored
/// queries rely on the current behavior, so it stays.
pub fn format_query(
    template: &str,
    params: &Map<String, Value>,
    now: NaiveDateTime,
) -> Result<String, FormatError> {
    let mut query = template.to_string();

    for (key, value) in params {
        let literal = ParamValue::classify(key, value)?.to_literal(key, now)?;
        query = query.replace(&format!("${key}"), &literal);
    }

    Ok(query)
}
