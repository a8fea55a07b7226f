//! Numeric registry (integer, float, sequence and link columns).

use crate::error::CompileResult;
use crate::types::{ConditionValue, FieldRef, OperatorKind};

use super::super::clause::{self, RangeOp};
use super::super::script::Script;
use super::{Builder, Fragment};

/// Builders for typed (static) numeric fields.
pub fn static_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::static_equals,
        OperatorKind::NotEquals => super::static_not_equals,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        OperatorKind::IsAnyOf | OperatorKind::IsNotAnyOf => super::static_membership,
        OperatorKind::More => static_more,
        OperatorKind::MoreOrEq => static_more_or_eq,
        OperatorKind::Less => static_less,
        OperatorKind::LessOrEq => static_less_or_eq,
        _ => return None,
    };
    Some(builder)
}

/// Builders for untyped (dynamic) numeric parameters.
pub fn dynamic_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::dynamic_equals,
        OperatorKind::NotEquals => super::dynamic_not_equals,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        OperatorKind::IsAnyOf | OperatorKind::IsNotAnyOf => super::dynamic_membership,
        OperatorKind::More => dynamic_more,
        OperatorKind::MoreOrEq => dynamic_more_or_eq,
        OperatorKind::Less => dynamic_less,
        OperatorKind::LessOrEq => dynamic_less_or_eq,
        _ => return None,
    };
    Some(builder)
}

/// Native range predicate on a typed field.
pub(crate) fn static_range(
    field: &FieldRef,
    value: &ConditionValue,
    op: RangeOp,
) -> CompileResult<Vec<Fragment>> {
    let value = super::single(field, value)?;
    Ok(vec![Fragment::predicate(clause::range(
        &field.path(),
        op,
        value,
    ))])
}

pub(crate) fn static_more(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    static_range(field, value, RangeOp::Gt)
}

pub(crate) fn static_more_or_eq(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    static_range(field, value, RangeOp::Gte)
}

pub(crate) fn static_less(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    static_range(field, value, RangeOp::Lt)
}

pub(crate) fn static_less_or_eq(
    field: &FieldRef,
    value: &ConditionValue,
) -> CompileResult<Vec<Fragment>> {
    static_range(field, value, RangeOp::Lte)
}

/// Scripted comparison: stored keywords are parsed as numbers at query time.
fn dynamic_range(
    field: &FieldRef,
    value: &ConditionValue,
    op: RangeOp,
) -> CompileResult<Vec<Fragment>> {
    let value = super::single(field, value)?;
    let script = Script::compare_number(&field.path(), op, value.clone());
    Ok(vec![Fragment::predicate(script.into_query())])
}

fn dynamic_more(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    dynamic_range(field, value, RangeOp::Gt)
}

fn dynamic_more_or_eq(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    dynamic_range(field, value, RangeOp::Gte)
}

fn dynamic_less(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    dynamic_range(field, value, RangeOp::Lt)
}

fn dynamic_less_or_eq(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    dynamic_range(field, value, RangeOp::Lte)
}
