//! SOQL templating with type-aware quoting.
//!
//! Queries are written as templates with `{name}` placeholders. Each
//! parameter is quoted according to its SOQL datatype before it is
//! substituted, so user input can never break out of its literal.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use sfrecord_rest::query_builder::prepare;
//!
//! let soql = prepare(
//!     "SELECT Id FROM Contact WHERE LastName = {name} AND Age > {age}",
//!     &[("name", json!("O'Brien")), ("age", json!(30))],
//! )?;
//! assert_eq!(
//!     soql,
//!     r"SELECT Id FROM Contact WHERE LastName = 'O\'Brien' AND Age > 30"
//! );
//! # Ok::<(), sfrecord_rest::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde_json::{Number, Value};
use sfrecord_client::security::soql;

use crate::error::{Error, Result, UsageError};

/// SOQL literal datatypes a value can be quoted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoqlType {
    /// Quoted and escaped text. Numbers are accepted and quoted as text.
    String,
    /// Whole numbers, from numbers or numeric text.
    Integer,
    /// Floating point numbers, from numbers or numeric text.
    Double,
    /// Integers, whole floats or numeric text, rendered as given.
    Decimal,
    Boolean,
    Null,
}

impl SoqlType {
    pub fn name(&self) -> &'static str {
        match self {
            SoqlType::String => "string",
            SoqlType::Integer => "integer",
            SoqlType::Double => "double",
            SoqlType::Decimal => "decimal",
            SoqlType::Boolean => "boolean",
            SoqlType::Null => "NULL",
        }
    }

    /// The datatype a value is quoted as when none is declared.
    ///
    /// Arrays and objects have none.
    pub fn infer(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => Some(SoqlType::String),
            Value::Number(n) if n.is_f64() => Some(SoqlType::Double),
            Value::Number(_) => Some(SoqlType::Integer),
            Value::Bool(_) => Some(SoqlType::Boolean),
            Value::Null => Some(SoqlType::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for SoqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoqlType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(SoqlType::String),
            "integer" | "int" => Ok(SoqlType::Integer),
            "double" | "float" => Ok(SoqlType::Double),
            "decimal" => Ok(SoqlType::Decimal),
            "boolean" | "bool" => Ok(SoqlType::Boolean),
            "NULL" | "null" => Ok(SoqlType::Null),
            other => Err(UsageError::UnsupportedDatatype {
                datatype: other.to_string(),
            }
            .into()),
        }
    }
}

/// Substitute every `{name}` placeholder in `template` with the quoted
/// parameter value.
///
/// Newlines are removed from the template first; a newline inside a
/// parameter value survives as `\n`. Placeholders without a parameter are
/// left as they are. When keys overlap the longest one wins, and
/// substituted text is never scanned again.
pub fn prepare(template: &str, parameters: &[(&str, Value)]) -> Result<String> {
    let mut replacements = Vec::with_capacity(parameters.len() + 1);
    replacements.push(("\n".to_string(), String::new()));
    for (name, value) in parameters {
        replacements.push((format!("{{{name}}}"), quote(value, None)?));
    }
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut prepared = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(ch) = rest.chars().next() {
        for (token, replacement) in &replacements {
            if rest.starts_with(token.as_str()) {
                prepared.push_str(replacement);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }
        prepared.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    Ok(prepared)
}

/// Render `value` as a SOQL literal of `datatype`, inferring the datatype
/// from the value when none is given.
///
/// Fails with `UnquotableValue` when the value does not fit the datatype,
/// and with `UnsupportedDatatype` when no datatype applies.
pub fn quote(value: &Value, datatype: Option<SoqlType>) -> Result<String> {
    let datatype = match datatype.or_else(|| SoqlType::infer(value)) {
        Some(datatype) => datatype,
        None => {
            return Err(UsageError::UnsupportedDatatype {
                datatype: type_name(value).to_string(),
            }
            .into())
        }
    };

    let quoted = match (datatype, value) {
        (SoqlType::String, Value::String(s)) => Some(format!("'{}'", soql::escape_string(s))),
        (SoqlType::String, Value::Number(n)) => Some(format!("'{}'", render_number(n))),

        (SoqlType::Integer, Value::Number(n)) => whole_number(n),
        (SoqlType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(|i| i.to_string()),

        (SoqlType::Double, Value::Number(n)) => Some(render_number(n)),
        (SoqlType::Double, Value::String(s)) => parse_finite(s).map(render_float),

        (SoqlType::Decimal, Value::Number(n)) => whole_number(n),
        (SoqlType::Decimal, Value::String(s)) => parse_finite(s)
            .filter(|_| s.trim().chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c)))
            .map(|_| s.trim().to_string()),

        (SoqlType::Boolean, Value::Bool(b)) => Some(b.to_string()),
        (SoqlType::Null, Value::Null) => Some("null".to_string()),
        _ => None,
    };

    quoted.ok_or_else(|| {
        UsageError::UnquotableValue {
            datatype: datatype.name().to_string(),
            actual_type: type_name(value).to_string(),
            value: value.clone(),
        }
        .into()
    })
}

/// Quote with a datatype given by name (e.g. `"decimal"`).
pub fn quote_as(value: &Value, datatype: &str) -> Result<String> {
    quote(value, Some(datatype.parse()?))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        other => SoqlType::infer(other).map_or("unknown", |t| t.name()),
    }
}

fn render_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => render_float(f),
        _ => n.to_string(),
    }
}

fn render_float(f: f64) -> String {
    format!("{f}")
}

/// Integers as they are, floats only when they have no fractional part.
fn whole_number(n: &Number) -> Option<String> {
    if !n.is_f64() {
        return Some(n.to_string());
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| (f as i64).to_string())
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}
