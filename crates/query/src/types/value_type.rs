//! Column value types.
//!
//! Every column, static or dynamic, resolves to exactly one [`ValueTypeKind`].
//! The kind selects both the coercion applied to user-supplied values and the
//! operator registry used to build query fragments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{CompileError, CompileResult};

/// Format used for normalized instants (`inPeriod` values).
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f+0000";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTypeKind {
    /// Free text.
    #[serde(alias = "str")]
    String,
    /// Signed integer.
    #[serde(alias = "int")]
    Integer,
    /// Floating point number.
    Float,
    /// True/false flag.
    #[serde(alias = "bool")]
    Boolean,
    /// Calendar date without time.
    Date,
    /// Instant with time and offset.
    Datetime,
    /// One of a fixed list of string values.
    Enum,
    /// Link to another inventory object (by id).
    #[serde(alias = "mo_link")]
    EntityLink,
    /// Bidirectional link between objects (by id).
    #[serde(alias = "two-way link", alias = "prm_link")]
    TwoWayLink,
    /// Computed value, stored as text.
    Formula,
    /// Auto-incremented counter.
    Sequence,
}

/// Operator registry a value type dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorFamily {
    String,
    Numeric,
    Date,
    Boolean,
}

impl ValueTypeKind {
    /// All value types.
    pub const ALL: [ValueTypeKind; 11] = [
        ValueTypeKind::String,
        ValueTypeKind::Integer,
        ValueTypeKind::Float,
        ValueTypeKind::Boolean,
        ValueTypeKind::Date,
        ValueTypeKind::Datetime,
        ValueTypeKind::Enum,
        ValueTypeKind::EntityLink,
        ValueTypeKind::TwoWayLink,
        ValueTypeKind::Formula,
        ValueTypeKind::Sequence,
    ];

    /// Returns the operator registry this type uses.
    pub fn family(self) -> OperatorFamily {
        match self {
            ValueTypeKind::String | ValueTypeKind::Enum | ValueTypeKind::Formula => {
                OperatorFamily::String
            }
            ValueTypeKind::Integer
            | ValueTypeKind::Float
            | ValueTypeKind::EntityLink
            | ValueTypeKind::TwoWayLink
            | ValueTypeKind::Sequence => OperatorFamily::Numeric,
            ValueTypeKind::Date | ValueTypeKind::Datetime => OperatorFamily::Date,
            ValueTypeKind::Boolean => OperatorFamily::Boolean,
        }
    }

    /// Returns the canonical name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueTypeKind::String => "string",
            ValueTypeKind::Integer => "integer",
            ValueTypeKind::Float => "float",
            ValueTypeKind::Boolean => "boolean",
            ValueTypeKind::Date => "date",
            ValueTypeKind::Datetime => "datetime",
            ValueTypeKind::Enum => "enum",
            ValueTypeKind::EntityLink => "entity_link",
            ValueTypeKind::TwoWayLink => "two_way_link",
            ValueTypeKind::Formula => "formula",
            ValueTypeKind::Sequence => "sequence",
        }
    }

    /// Coerces a raw JSON scalar to this type.
    ///
    /// `column` is only used for error reporting.
    pub fn coerce(self, column: &str, value: &Value) -> CompileResult<Value> {
        let coerced = match self.family() {
            OperatorFamily::String => coerce_string(value),
            OperatorFamily::Boolean => coerce_bool(value),
            OperatorFamily::Numeric if self == ValueTypeKind::Float => coerce_float(value),
            OperatorFamily::Numeric => coerce_integer(value),
            OperatorFamily::Date if self == ValueTypeKind::Date => coerce_date(value),
            OperatorFamily::Date => coerce_datetime(value),
        };

        coerced.ok_or_else(|| CompileError::ValueCoercion {
            column: column.to_string(),
            value: value.clone(),
            expected: self,
        })
    }
}

impl fmt::Display for ValueTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueTypeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_lowercase()))
            .map_err(|_| format!("unknown value type: {}", s))
    }
}

fn coerce_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => Some(json!(s)),
        Value::Number(n) => Some(json!(n.to_string())),
        Value::Bool(b) => Some(json!(b.to_string())),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(json!(i))
            } else {
                let f = n.as_f64()?;
                (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| json!(f as i64))
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(|i| json!(i)),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then(|| json!(f))
}

fn coerce_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(json!(b)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(json!(true)),
            "false" => Some(json!(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_date(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(json!(date.format(DATE_FORMAT).to_string()));
    }
    parse_instant(s).map(|date| json!(date.format(DATE_FORMAT).to_string()))
}

fn coerce_datetime(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    if parse_instant(s).is_some() || NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok() {
        Some(json!(s))
    } else {
        None
    }
}

/// Parses an RFC 3339 instant or one in [`INSTANT_FORMAT`] (`+0000` offset).
fn parse_instant(s: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.date_naive())
}
