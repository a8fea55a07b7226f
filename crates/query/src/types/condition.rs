//! Typed search conditions.
//!
//! A [`SearchCondition`] is a filter item whose column has been resolved and
//! whose value has been coerced to the declared type.

use serde_json::Value;

use crate::error::{CompileError, CompileResult};

use super::field::{FieldRef, ResolvedField};
use super::filter::{FilterItem, OperatorKind};
use super::value_type::ValueTypeKind;

/// A coerced condition value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// No value (`isEmpty` / `isNotEmpty`).
    Null,
    /// A single coerced value.
    Scalar(Value),
    /// A list of coerced values.
    List(Vec<Value>),
}

impl ConditionValue {
    /// Returns the value as a list, wrapping a scalar in a singleton.
    pub fn to_list(&self) -> Vec<Value> {
        match self {
            ConditionValue::Null => Vec::new(),
            ConditionValue::Scalar(v) => vec![v.clone()],
            ConditionValue::List(values) => values.clone(),
        }
    }

    /// Returns the value as JSON (`null`, scalar, or array).
    pub fn to_json(&self) -> Value {
        match self {
            ConditionValue::Null => Value::Null,
            ConditionValue::Scalar(v) => v.clone(),
            ConditionValue::List(values) => Value::Array(values.clone()),
        }
    }
}

/// A resolved, coerced condition ready for fragment building.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCondition {
    /// The field the condition applies to.
    pub field: FieldRef,
    /// The comparison operator.
    pub operator: OperatorKind,
    /// The declared type of the field.
    pub column_type: ValueTypeKind,
    /// Whether the field holds multiple values.
    pub multiple: bool,
    /// The coerced value.
    pub value: ConditionValue,
}

impl SearchCondition {
    /// Builds a condition from a filter item and the resolved column type.
    pub fn new(field: FieldRef, item: &FilterItem, resolved: &ResolvedField) -> CompileResult<Self> {
        let column = field.column_name();
        let val_type = resolved.val_type;
        let raw = item.value();
        let operator = item.operator();

        let value = if operator.is_emptiness() {
            ConditionValue::Null
        } else if operator == OperatorKind::InPeriod {
            // already normalized to an instant when the item was built
            ConditionValue::Scalar(raw.clone())
        } else if operator.is_membership() {
            let values = match raw {
                Value::Array(values) => values
                    .iter()
                    .map(|v| val_type.coerce(column, v))
                    .collect::<CompileResult<Vec<_>>>()?,
                scalar => vec![val_type.coerce(column, scalar)?],
            };
            ConditionValue::List(values)
        } else {
            match raw {
                // an empty list would build no fragment and match everything
                Value::Array(values) if values.is_empty() => {
                    return Err(CompileError::validation(format!(
                        "operator '{}' on column '{}' needs at least one value",
                        operator, column
                    )));
                }
                Value::Array(values) if resolved.multiple => ConditionValue::List(
                    values
                        .iter()
                        .map(|v| val_type.coerce(column, v))
                        .collect::<CompileResult<Vec<_>>>()?,
                ),
                Value::Array(_) => {
                    return Err(CompileError::ValueCoercion {
                        column: column.to_string(),
                        value: raw.clone(),
                        expected: val_type,
                    });
                }
                scalar => ConditionValue::Scalar(val_type.coerce(column, scalar)?),
            }
        };

        Ok(Self {
            field,
            operator,
            column_type: val_type,
            multiple: resolved.multiple,
            value,
        })
    }
}
