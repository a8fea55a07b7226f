//! Filter and sort input model.
//!
//! These types validate the *shape* of caller input only. Values stay raw
//! JSON until the column's type is resolved; the one exception is
//! [`OperatorKind::InPeriod`], whose minute count is turned into an absolute
//! UTC instant when the [`FilterItem`] is built.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{CompileError, CompileResult};

use super::field::FieldRef;
use super::value_type::INSTANT_FORMAT;

static COLUMN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+|[A-Za-z_][A-Za-z0-9_]*)$").expect("column name pattern is valid")
});

/// Comparison operators accepted in filter items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorKind {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    IsAnyOf,
    IsNotAnyOf,
    More,
    MoreOrEq,
    Less,
    LessOrEq,
    InPeriod,
}

impl OperatorKind {
    /// Returns the wire name of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Equals => "equals",
            OperatorKind::NotEquals => "notEquals",
            OperatorKind::Contains => "contains",
            OperatorKind::NotContains => "notContains",
            OperatorKind::StartsWith => "startsWith",
            OperatorKind::EndsWith => "endsWith",
            OperatorKind::IsEmpty => "isEmpty",
            OperatorKind::IsNotEmpty => "isNotEmpty",
            OperatorKind::IsAnyOf => "isAnyOf",
            OperatorKind::IsNotAnyOf => "isNotAnyOf",
            OperatorKind::More => "more",
            OperatorKind::MoreOrEq => "moreOrEq",
            OperatorKind::Less => "less",
            OperatorKind::LessOrEq => "lessOrEq",
            OperatorKind::InPeriod => "inPeriod",
        }
    }

    /// Returns true for the operators that carry no value.
    pub fn is_emptiness(self) -> bool {
        matches!(self, OperatorKind::IsEmpty | OperatorKind::IsNotEmpty)
    }

    /// Returns true for the operators whose value is a list.
    pub fn is_membership(self) -> bool {
        matches!(self, OperatorKind::IsAnyOf | OperatorKind::IsNotAnyOf)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the items of a filter column combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

/// A single operator/value pair.
///
/// Items are compared, ordered and hashed on the operator plus the canonical
/// rendering of the value, so a column's items form a set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawFilterItem")]
pub struct FilterItem {
    operator: OperatorKind,
    value: Value,
}

#[derive(Deserialize)]
struct RawFilterItem {
    operator: OperatorKind,
    #[serde(default)]
    value: Value,
}

impl TryFrom<RawFilterItem> for FilterItem {
    type Error = CompileError;

    fn try_from(raw: RawFilterItem) -> Result<Self, Self::Error> {
        FilterItem::new(raw.operator, raw.value)
    }
}

impl FilterItem {
    /// Creates a filter item, normalizing `inPeriod` against the current time.
    pub fn new(operator: OperatorKind, value: Value) -> CompileResult<Self> {
        Self::new_at(operator, value, Utc::now())
    }

    /// Creates a filter item, normalizing `inPeriod` against `now`.
    pub fn new_at(operator: OperatorKind, value: Value, now: DateTime<Utc>) -> CompileResult<Self> {
        let value = if operator == OperatorKind::InPeriod {
            let minutes = period_minutes(&value).ok_or_else(|| {
                CompileError::validation(format!(
                    "inPeriod expects an integer number of minutes, got {}",
                    value
                ))
            })?;
            let since = Duration::try_minutes(minutes)
                .and_then(|period| now.checked_sub_signed(period))
                .ok_or_else(|| {
                    CompileError::validation(format!(
                        "inPeriod of {} minutes is out of range",
                        minutes
                    ))
                })?;
            Value::String(since.format(INSTANT_FORMAT).to_string())
        } else {
            value
        };

        Ok(Self { operator, value })
    }

    /// Returns the operator.
    pub fn operator(&self) -> OperatorKind {
        self.operator
    }

    /// Returns the (raw, or normalized for `inPeriod`) value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn period_minutes(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Renders a value with `-0.0` folded into `0.0`.
fn canonical(value: &Value) -> String {
    fn fold(value: &Value) -> Value {
        match value {
            Value::Number(n) if n.as_f64() == Some(0.0) && n.is_f64() => json!(0.0),
            Value::Array(items) => Value::Array(items.iter().map(fold).collect()),
            Value::Object(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), fold(v))).collect(),
            ),
            other => other.clone(),
        }
    }
    fold(value).to_string()
}

impl PartialEq for FilterItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FilterItem {}

impl Hash for FilterItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operator.hash(state);
        canonical(&self.value).hash(state);
    }
}

impl Ord for FilterItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.operator
            .cmp(&other.operator)
            .then_with(|| canonical(&self.value).cmp(&canonical(&other.value)))
    }
}

impl PartialOrd for FilterItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Column names arrive either as strings or as bare integers (parameter ids).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumnName {
    Text(String),
    Number(u64),
}

impl From<RawColumnName> for String {
    fn from(raw: RawColumnName) -> Self {
        match raw {
            RawColumnName::Text(s) => s,
            RawColumnName::Number(n) => n.to_string(),
        }
    }
}

fn validate_column_name(name: String) -> CompileResult<String> {
    if COLUMN_NAME.is_match(&name) {
        Ok(name)
    } else {
        Err(CompileError::validation(format!(
            "column name '{}' is neither a parameter id nor an attribute name",
            name
        )))
    }
}

/// All filter items applied to one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterColumn")]
pub struct FilterColumn {
    #[serde(rename = "columnName")]
    column_name: String,
    rule: Rule,
    filters: BTreeSet<FilterItem>,
}

#[derive(Deserialize)]
struct RawFilterColumn {
    #[serde(rename = "columnName")]
    column_name: RawColumnName,
    rule: Rule,
    filters: Vec<FilterItem>,
}

impl TryFrom<RawFilterColumn> for FilterColumn {
    type Error = CompileError;

    fn try_from(raw: RawFilterColumn) -> Result<Self, Self::Error> {
        FilterColumn::new(String::from(raw.column_name), raw.rule, raw.filters)
    }
}

impl FilterColumn {
    /// Creates a filter column. Fails if `filters` is empty.
    pub fn new(
        column_name: impl Into<String>,
        rule: Rule,
        filters: impl IntoIterator<Item = FilterItem>,
    ) -> CompileResult<Self> {
        let column_name = validate_column_name(column_name.into())?;
        let filters: BTreeSet<FilterItem> = filters.into_iter().collect();
        if filters.is_empty() {
            return Err(CompileError::validation(format!(
                "column '{}' has no filters",
                column_name
            )));
        }

        Ok(Self {
            column_name,
            rule,
            filters,
        })
    }

    /// Returns the canonical column name.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Returns the combination rule.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Returns the deduplicated filter items in canonical order.
    pub fn filters(&self) -> impl ExactSizeIterator<Item = &FilterItem> {
        self.filters.iter()
    }

    /// Returns the field this column refers to.
    pub fn field_ref(&self) -> FieldRef {
        FieldRef::parse(&self.column_name)
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSortColumn")]
pub struct SortColumn {
    #[serde(rename = "columnName")]
    column_name: String,
    ascending: bool,
}

#[derive(Deserialize)]
struct RawSortColumn {
    #[serde(rename = "columnName")]
    column_name: RawColumnName,
    #[serde(default = "default_ascending")]
    ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl TryFrom<RawSortColumn> for SortColumn {
    type Error = CompileError;

    fn try_from(raw: RawSortColumn) -> Result<Self, Self::Error> {
        SortColumn::new(String::from(raw.column_name), raw.ascending)
    }
}

impl SortColumn {
    /// Creates a sort column.
    pub fn new(column_name: impl Into<String>, ascending: bool) -> CompileResult<Self> {
        Ok(Self {
            column_name: validate_column_name(column_name.into())?,
            ascending,
        })
    }

    /// Returns the canonical column name.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Returns true for ascending order.
    pub fn ascending(&self) -> bool {
        self.ascending
    }

    /// Returns the field this column refers to.
    pub fn field_ref(&self) -> FieldRef {
        FieldRef::parse(&self.column_name)
    }
}

/// Parses a JSON array of filter columns.
pub fn parse_filters(value: Value) -> CompileResult<Vec<FilterColumn>> {
    serde_json::from_value(value).map_err(|e| CompileError::validation(e.to_string()))
}

/// Parses a JSON array of sort columns.
pub fn parse_sort(value: Value) -> CompileResult<Vec<SortColumn>> {
    serde_json::from_value(value).map_err(|e| CompileError::validation(e.to_string()))
}
