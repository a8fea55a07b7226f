//! Primitive Elasticsearch query clauses.
//!
//! Both the filter assembler and the algebra parser emit their leaves
//! through these helpers so the two paths produce identical fragments.

use serde_json::{Map, Value, json};

/// Bound kind of a range clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeOp {
    /// Returns the range clause key (`gt`, `gte`, ...).
    pub fn key(self) -> &'static str {
        match self {
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
        }
    }

    /// Returns the comparison symbol used in scripts.
    pub fn symbol(self) -> &'static str {
        match self {
            RangeOp::Gt => ">",
            RangeOp::Gte => ">=",
            RangeOp::Lt => "<",
            RangeOp::Lte => "<=",
        }
    }
}

/// `{"exists": {"field": field}}`
pub fn exists(field: &str) -> Value {
    json!({ "exists": { "field": field } })
}

/// `{"match": {field: value}}`
pub fn match_value(field: &str, value: &Value) -> Value {
    json!({ "match": { field: value } })
}

/// `{"term": {field: value}}`
pub fn term(field: &str, value: &Value) -> Value {
    json!({ "term": { field: value } })
}

/// `{"terms": {field: [values]}}`
pub fn terms(field: &str, values: &[Value]) -> Value {
    json!({ "terms": { field: values } })
}

/// `{"range": {field: {op: value}}}`
pub fn range(field: &str, op: RangeOp, value: &Value) -> Value {
    let mut bounds = Map::new();
    bounds.insert(op.key().to_string(), value.clone());
    range_bounds(field, bounds)
}

/// `{"range": {field: bounds}}` with several bounds at once.
pub fn range_bounds(field: &str, bounds: Map<String, Value>) -> Value {
    json!({ "range": { field: Value::Object(bounds) } })
}

/// Case-insensitive wildcard clause. `pattern` must already be escaped.
pub fn wildcard(field: &str, pattern: &str) -> Value {
    json!({
        "wildcard": {
            field: { "value": pattern, "case_insensitive": true }
        }
    })
}

/// Case-insensitive prefix clause.
pub fn prefix(field: &str, value: &str) -> Value {
    json!({
        "prefix": {
            field: { "value": value, "case_insensitive": true }
        }
    })
}

/// Escapes wildcard metacharacters so user text matches literally.
pub fn escape_wildcard(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '?') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exists() {
        assert_eq!(exists("status"), json!({"exists": {"field": "status"}}));
    }

    #[test]
    fn test_range() {
        assert_eq!(
            range("version", RangeOp::Lte, &json!(3)),
            json!({"range": {"version": {"lte": 3}}})
        );
    }

    #[test]
    fn test_escape_wildcard() {
        assert_eq!(escape_wildcard("a*b?c\\d"), "a\\*b\\?c\\\\d");
        assert_eq!(escape_wildcard("plain"), "plain");
    }
}
