//! Boolean registry.

use crate::types::OperatorKind;

use super::Builder;

/// Builders for typed (static) boolean fields.
pub fn static_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::static_equals,
        OperatorKind::NotEquals => super::static_not_equals,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        _ => return None,
    };
    Some(builder)
}

/// Builders for untyped (dynamic) boolean parameters.
pub fn dynamic_builder(operator: OperatorKind) -> Option<Builder> {
    let builder: Builder = match operator {
        OperatorKind::Equals => super::dynamic_equals,
        OperatorKind::NotEquals => super::dynamic_not_equals,
        OperatorKind::IsEmpty | OperatorKind::IsNotEmpty => super::existence,
        _ => return None,
    };
    Some(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elasticsearch::operators::Fragment;
    use crate::types::{ConditionValue, FieldRef};
    use serde_json::json;

    #[test]
    fn test_static_equals() {
        let field = FieldRef::parse("active");
        let builder = static_builder(OperatorKind::Equals).unwrap();
        let fragments = builder(&field, &ConditionValue::Scalar(json!(true))).unwrap();
        assert_eq!(
            fragments,
            vec![
                Fragment::guard(json!({"exists": {"field": "active"}})),
                Fragment::predicate(json!({"match": {"active": true}})),
            ]
        );
    }

    #[test]
    fn test_dynamic_not_equals() {
        let field = FieldRef::parse("8");
        let builder = dynamic_builder(OperatorKind::NotEquals).unwrap();
        let fragments = builder(&field, &ConditionValue::Scalar(json!(false))).unwrap();
        assert_eq!(
            fragments,
            vec![Fragment::predicate(json!({"term": {"parameters.8": false}}))]
        );
    }

    #[test]
    fn test_only_equality_and_emptiness() {
        for op in [
            OperatorKind::Contains,
            OperatorKind::More,
            OperatorKind::IsAnyOf,
            OperatorKind::InPeriod,
        ] {
            assert!(static_builder(op).is_none());
            assert!(dynamic_builder(op).is_none());
        }
    }
}
