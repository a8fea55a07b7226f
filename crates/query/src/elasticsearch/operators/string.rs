//! String registry (string, enum and formula columns).

use crate::error::CompileResult;
use crate::types::{ConditionValue, FieldRef, OperatorKind};

use super::super::clause;
use super::super::script::{Script, TextPattern};
use super::{Builder, Fragment};

/// Builders for typed (static) string fields.
pub fn static_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::static_equals,
        OperatorKind::NotEquals => super::static_not_equals,
        OperatorKind::Contains | OperatorKind::NotContains => static_contains,
        OperatorKind::StartsWith => static_starts_with,
        OperatorKind::EndsWith => static_ends_with,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        OperatorKind::IsAnyOf | OperatorKind::IsNotAnyOf => super::static_membership,
        _ => return None,
    };
    Some(builder)
}

/// Builders for untyped (dynamic) string parameters.
pub fn dynamic_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::dynamic_equals,
        OperatorKind::NotEquals => super::dynamic_not_equals,
        OperatorKind::Contains | OperatorKind::NotContains => dynamic_contains,
        OperatorKind::StartsWith => dynamic_starts_with,
        OperatorKind::EndsWith => dynamic_ends_with,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        OperatorKind::IsAnyOf | OperatorKind::IsNotAnyOf => super::dynamic_membership,
        _ => return None,
    };
    Some(builder)
}

/// Text of each value; a list yields one needle per element.
fn needles(value: &ConditionValue) -> Vec<String> {
    value
        .to_list()
        .iter()
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
        .collect()
}

fn static_contains(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    let path = field.path();
    Ok(needles(value)
        .iter()
        .map(|n| {
            let pattern = format!("*{}*", clause::escape_wildcard(n));
            Fragment::predicate(clause::wildcard(&path, &pattern))
        })
        .collect())
}

fn static_starts_with(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    let path = field.path();
    Ok(needles(value)
        .iter()
        .map(|n| Fragment::predicate(clause::prefix(&path, n)))
        .collect())
}

fn static_ends_with(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    let path = field.path();
    Ok(needles(value)
        .iter()
        .map(|n| {
            let pattern = format!("*{}", clause::escape_wildcard(n));
            Fragment::predicate(clause::wildcard(&path, &pattern))
        })
        .collect())
}

fn dynamic_text(
    field: &FieldRef,
    value: &ConditionValue,
    pattern: TextPattern,
) -> CompileResult<Vec<Fragment>> {
    let path = field.path();
    Ok(needles(value)
        .iter()
        .map(|n| Fragment::predicate(Script::match_text(&path, pattern, n).into_query()))
        .collect())
}

fn dynamic_contains(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    dynamic_text(field, value, TextPattern::Contains)
}

fn dynamic_starts_with(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    dynamic_text(field, value, TextPattern::StartsWith)
}

fn dynamic_ends_with(field: &FieldRef, value: &ConditionValue) -> CompileResult<Vec<Fragment>> {
    dynamic_text(field, value, TextPattern::EndsWith)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(operator: OperatorKind, name: &str, value: ConditionValue) -> Vec<Fragment> {
        let field = FieldRef::parse(name);
        let builder = match field {
            FieldRef::Attribute(_) => static_builder(operator),
            FieldRef::Parameter(_) => dynamic_builder(operator),
        }
        .unwrap();
        builder(&field, &value).unwrap()
    }

    #[test]
    fn test_static_equals_asserts_existence() {
        let fragments = build(
            OperatorKind::Equals,
            "status",
            ConditionValue::Scalar(json!("active")),
        );
        assert_eq!(
            fragments,
            vec![
                Fragment::guard(json!({"exists": {"field": "status"}})),
                Fragment::predicate(json!({"match": {"status": "active"}})),
            ]
        );
    }

    #[test]
    fn test_static_not_equals_omits_existence() {
        let fragments = build(
            OperatorKind::NotEquals,
            "status",
            ConditionValue::Scalar(json!("active")),
        );
        assert_eq!(
            fragments,
            vec![Fragment::predicate(json!({"match": {"status": "active"}}))]
        );
    }

    #[test]
    fn test_static_patterns() {
        let value = ConditionValue::Scalar(json!("Rout"));
        let contains = build(OperatorKind::Contains, "name", value.clone());
        assert_eq!(
            contains[0].clause,
            json!({"wildcard": {"name": {"value": "*Rout*", "case_insensitive": true}}})
        );
        let starts = build(OperatorKind::StartsWith, "name", value.clone());
        assert_eq!(
            starts[0].clause,
            json!({"prefix": {"name": {"value": "Rout", "case_insensitive": true}}})
        );
        let ends = build(OperatorKind::EndsWith, "name", value);
        assert_eq!(ends[0].clause["wildcard"]["name"]["value"], json!("*Rout"));
    }

    #[test]
    fn test_static_contains_escapes_wildcards() {
        let fragments = build(
            OperatorKind::Contains,
            "name",
            ConditionValue::Scalar(json!("50*")),
        );
        assert_eq!(
            fragments[0].clause["wildcard"]["name"]["value"],
            json!("*50\\**")
        );
    }

    #[test]
    fn test_not_contains_reuses_contains_fragment() {
        let value = ConditionValue::Scalar(json!("x"));
        assert_eq!(
            build(OperatorKind::Contains, "name", value.clone()),
            build(OperatorKind::NotContains, "name", value)
        );
    }

    #[test]
    fn test_dynamic_contains_uses_script() {
        let fragments = build(
            OperatorKind::Contains,
            "17",
            ConditionValue::Scalar(json!("Fiber")),
        );
        assert_eq!(fragments.len(), 1);
        let script = &fragments[0].clause["script"]["script"];
        assert_eq!(script["params"]["field"], json!("parameters.17"));
        assert_eq!(script["params"]["value"], json!("fiber"));
    }

    #[test]
    fn test_dynamic_equals_uses_term() {
        let fragments = build(
            OperatorKind::Equals,
            "17",
            ConditionValue::Scalar(json!("a")),
        );
        assert_eq!(
            fragments,
            vec![
                Fragment::guard(json!({"exists": {"field": "parameters.17"}})),
                Fragment::predicate(json!({"term": {"parameters.17": "a"}})),
            ]
        );
    }

    #[test]
    fn test_static_membership() {
        let fragments = build(
            OperatorKind::IsAnyOf,
            "status",
            ConditionValue::List(vec![json!("a"), json!("b")]),
        );
        assert_eq!(
            fragments,
            vec![Fragment::predicate(json!({"terms": {"status": ["a", "b"]}}))]
        );
    }

    #[test]
    fn test_no_ordering_operators() {
        assert!(static_builder(OperatorKind::More).is_none());
        assert!(dynamic_builder(OperatorKind::LessOrEq).is_none());
        assert!(static_builder(OperatorKind::InPeriod).is_none());
    }
}
