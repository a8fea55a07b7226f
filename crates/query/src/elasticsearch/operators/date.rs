//! Date registry (date and datetime columns).

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::error::{CompileError, CompileResult};
use crate::types::{ConditionValue, FieldRef, OperatorKind, ValueTypeKind};

use super::super::clause::RangeOp;
use super::super::script::Script;
use super::number::{static_less, static_less_or_eq, static_more, static_more_or_eq};
use super::{Builder, Fragment};

/// Builders for typed (static) date fields.
pub fn static_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::static_equals,
        OperatorKind::NotEquals => super::static_not_equals,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        OperatorKind::IsAnyOf | OperatorKind::IsNotAnyOf => super::static_membership,
        OperatorKind::More => static_more,
        OperatorKind::MoreOrEq | OperatorKind::InPeriod => static_more_or_eq,
        OperatorKind::Less => static_less,
        OperatorKind::LessOrEq => static_less_or_eq,
        _ => return None,
    };
    Some(builder)
}

/// Builders for untyped (dynamic) date parameters.
pub fn dynamic_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::dynamic_equals,
        OperatorKind::NotEquals => super::dynamic_not_equals,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        OperatorKind::IsAnyOf | OperatorKind::IsNotAnyOf => super::dynamic_membership,
        OperatorKind::More => dynamic_more,
        OperatorKind::MoreOrEq | OperatorKind::InPeriod => dynamic_more_or_eq,
        OperatorKind::Less => dynamic_less,
        OperatorKind::LessOrEq => dynamic_less_or_eq,
        _ => return None,
    };
    Some(builder)
}

/// Epoch millis of a coerced date or datetime value.
pub(crate) fn epoch_millis(field: &FieldRef, value: &Value) -> CompileResult<i64> {
    let millis = value.as_str().and_then(|s| {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
        }
        DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .ok()
            .map(|dt| dt.timestamp_millis())
    });

    millis.ok_or_else(|| CompileError::ValueCoercion {
        column: field.column_name().to_string(),
        value: value.clone(),
        expected: ValueTypeKind::Datetime,
    })
}

/// Scripted comparison: stored keywords are parsed as instants at query time.
fn dynamic_range(
    field: &FieldRef,
    value: &ConditionValue,
    op: RangeOp,
) -> CompileResult<Vec<Fragment>> {
    let millis = epoch_millis(field, super::single(field, value)?)?;
    let script = Script::compare_instant(&field.path(), op, millis);
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_epoch_millis() {
        let field = FieldRef::parse("5");
        assert_eq!(epoch_millis(&field, &json!("1970-01-02")).unwrap(), 86_400_000);
        assert_eq!(
            epoch_millis(&field, &json!("1970-01-01T00:00:01.500+0000")).unwrap(),
            1_500
        );
        assert_eq!(
            epoch_millis(&field, &json!("1970-01-01T01:00:00+01:00")).unwrap(),
            0
        );
        assert!(epoch_millis(&field, &json!(12)).is_err());
    }

    #[test]
    fn test_static_in_period_is_range_from_instant() {
        let field = FieldRef::parse("creation_date");
        let builder = static_builder(OperatorKind::InPeriod).unwrap();
        let fragments = builder(
            &field,
            &ConditionValue::Scalar(json!("2024-03-10T11:30:00.000+0000")),
        )
        .unwrap();
        assert_eq!(
            fragments,
            vec![Fragment::predicate(json!({
                "range": {"creation_date": {"gte": "2024-03-10T11:30:00.000+0000"}}
            }))]
        );
    }

    #[test]
    fn test_dynamic_in_period_is_scripted() {
        let field = FieldRef::parse("5");
        let builder = dynamic_builder(OperatorKind::InPeriod).unwrap();
        let fragments = builder(
            &field,
            &ConditionValue::Scalar(json!("1970-01-01T00:00:01.000+0000")),
        )
        .unwrap();
        let script = &fragments[0].clause["script"]["script"];
        assert!(script["source"].as_str().unwrap().contains("stored >= params.value"));
        assert_eq!(script["params"]["value"], json!(1000));
    }

    #[test]
    fn test_no_string_operators() {
        assert!(static_builder(OperatorKind::Contains).is_none());
        assert!(dynamic_builder(OperatorKind::EndsWith).is_none());
    }
}
