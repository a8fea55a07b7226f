//! Operator registries.
//!
//! One registry per operator family and field shape. Each registry maps an
//! [`OperatorKind`] to a [`Builder`] producing the query fragments for a
//! condition. A missing entry means the combination is unsupported.

pub mod boolean;
pub mod date;
pub mod number;
pub mod string;

use serde_json::Value;

use crate::error::{CompileError, CompileResult};
use crate::types::{
    ConditionValue, FieldRef, OperatorFamily, OperatorKind, SearchCondition, Shape, ValueTypeKind,
};

use super::clause;

/// How a fragment is bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Existence guard; always lands in `must`.
    Guard,
    /// The operator's own predicate; bucketed by operator.
    Predicate,
}

/// One atomic query clause before bucketing.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub role: Role,
    pub clause: Value,
}

impl Fragment {
    /// A guard fragment.
    pub fn guard(clause: Value) -> Self {
        Self {
            role: Role::Guard,
            clause,
        }
    }

    /// A predicate fragment.
    pub fn predicate(clause: Value) -> Self {
        Self {
            role: Role::Predicate,
            clause,
        }
    }
}

/// Builds the fragments of one condition.
pub type Builder = fn(&FieldRef, &ConditionValue) -> CompileResult<Vec<Fragment>>;

/// Looks up the builder for an operator, value type and field shape.
pub fn builder_for(
    operator: OperatorKind,
    val_type: ValueTypeKind,
    shape: Shape,
) -> CompileResult<Builder> {
    let builder = match (val_type.family(), shape) {
        (OperatorFamily::String, Shape::Static) => string::static_builder(operator),
        (OperatorFamily::String, Shape::Dynamic) => string::dynamic_builder(operator),
        (OperatorFamily::Numeric, Shape::Static) => number::static_builder(operator),
        (OperatorFamily::Numeric, Shape::Dynamic) => number::dynamic_builder(operator),
        (OperatorFamily::Date, Shape::Static) => date::static_builder(operator),
        (OperatorFamily::Date, Shape::Dynamic) => date::dynamic_builder(operator),
        (OperatorFamily::Boolean, Shape::Static) => boolean::static_builder(operator),
        (OperatorFamily::Boolean, Shape::Dynamic) => boolean::dynamic_builder(operator),
    };

    builder.ok_or(CompileError::UnsupportedOperator { operator, val_type })
}

/// Builds the fragments of a condition through its registry.
pub fn build_fragments(condition: &SearchCondition) -> CompileResult<Vec<Fragment>> {
    let builder = builder_for(
        condition.operator,
        condition.column_type,
        condition.field.shape(),
    )?;
    builder(&condition.field, &condition.value)
}

/// Returns the single value of a condition, rejecting lists and nulls.
pub(crate) fn single<'a>(field: &FieldRef, value: &'a ConditionValue) -> CompileResult<&'a Value> {
    match value {
        ConditionValue::Scalar(v) => Ok(v),
        ConditionValue::List(_) | ConditionValue::Null => Err(CompileError::validation(format!(
            "column '{}' expects a single value",
            field
        ))),
    }
}

// Builders shared by every family.

/// `isEmpty` / `isNotEmpty`: both are the bare existence check.
pub(crate) fn existence(field: &FieldRef, _value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    Ok(vec![Fragment::predicate(clause::exists(&field.path()))])
}

/// Exact match on a typed field: existence guard plus match.
pub(crate) fn static_equals(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    let path = field.path();
    Ok(vec![
        Fragment::guard(clause::exists(&path)),
        Fragment::predicate(static_match(&path, value)),
    ])
}

/// Non-match on a typed field; a missing field counts as not equal.
pub(crate) fn static_not_equals(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    Ok(vec![Fragment::predicate(static_match(&field.path(), value))])
}

fn static_match(path: &str, value: &ConditionValue) -> Value {
    match value {
        ConditionValue::List(values) => clause::terms(path, values),
        other => clause::match_value(path, &other.to_json()),
    }
}

/// Membership on a typed field.
pub(crate) fn static_membership(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    Ok(vec![Fragment::predicate(clause::terms(
        &field.path(),
        &value.to_list(),
    ))])
}

/// Exact match on an untyped parameter: existence guard plus term(s).
pub(crate) fn dynamic_equals(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    let path = field.path();
    Ok(vec![
        Fragment::guard(clause::exists(&path)),
        Fragment::predicate(dynamic_term(&path, value)),
    ])
}

/// Non-match on an untyped parameter.
pub(crate) fn dynamic_not_equals(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    Ok(vec![Fragment::predicate(dynamic_term(&field.path(), value))])
}

fn dynamic_term(path: &str, value: &ConditionValue) -> Value {
    match value {
        ConditionValue::List(values) => clause::terms(path, values),
        other => clause::term(path, &other.to_json()),
    }
}

/// Membership on an untyped parameter.
///
/// The guard is kept in `must` for `isNotAnyOf` too, while the membership
/// predicate goes to `must_not`.
pub(crate) fn dynamic_membership(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    let path = field.path();
    Ok(vec![
        Fragment::guard(clause::exists(&path)),
        Fragment::predicate(clause::terms(&path, &value.to_list())),
    ])
}
