//! Elasticsearch bool query assembler.
//!
//! Translates typed [`SearchCondition`]s into Elasticsearch Query DSL JSON.
//! Fragments are bucketed into `must` / `must_not` by operator; an OR rule
//! wraps each condition in its own `should` branch so conditions that expand
//! to several fragments stay jointly satisfied within their branch.

use serde_json::{Value, json};

use crate::error::CompileResult;
use crate::types::{FilterColumn, OperatorKind, ResolvedFields, Rule, SearchCondition, Shape};

use super::operators::{self, Role};

/// Slot of a bool query a fragment is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Must,
    MustNot,
}

impl Bucket {
    /// Bucket of an operator's predicate fragments.
    pub fn for_operator(operator: OperatorKind) -> Self {
        match operator {
            OperatorKind::NotEquals
            | OperatorKind::IsEmpty
            | OperatorKind::NotContains
            | OperatorKind::IsNotAnyOf => Bucket::MustNot,
            _ => Bucket::Must,
        }
    }
}

/// The `must` / `must_not` halves of a bool query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Value>,
    pub must_not: Vec<Value>,
}

impl BoolQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both buckets are empty.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty()
    }

    /// Adds a clause to a bucket.
    pub fn push(&mut self, bucket: Bucket, clause: Value) {
        match bucket {
            Bucket::Must => self.must.push(clause),
            Bucket::MustNot => self.must_not.push(clause),
        }
    }

    /// Appends the buckets of `other` (AND).
    pub fn extend(&mut self, other: BoolQuery) {
        self.must.extend(other.must);
        self.must_not.extend(other.must_not);
    }

    /// `{"bool": {"must": [...], "must_not": [...]}}`, omitting empty buckets.
    pub fn to_json(&self) -> Value {
        let mut body = serde_json::Map::new();
        if !self.must.is_empty() {
            body.insert("must".to_string(), json!(self.must));
        }
        if !self.must_not.is_empty() {
            body.insert("must_not".to_string(), json!(self.must_not));
        }
        json!({ "bool": Value::Object(body) })
    }
}

/// Builds bool queries from typed conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EsQueryBuilder;

impl EsQueryBuilder {
    /// Creates a query builder.
    pub fn new() -> Self {
        Self
    }

    /// Builds the query for a list of conditions combined by `rule`.
    pub fn build(&self, rule: Rule, conditions: &[SearchCondition]) -> CompileResult<BoolQuery> {
        // static attributes first, then dynamic parameters, each in input order
        let (static_conditions, dynamic_conditions): (Vec<&SearchCondition>, Vec<_>) = conditions
            .iter()
            .partition(|c| c.field.shape() == Shape::Static);

        let mut per_condition = Vec::with_capacity(conditions.len());
        for condition in static_conditions.into_iter().chain(dynamic_conditions) {
            per_condition.push(self.build_condition(condition)?);
        }

        Ok(match rule {
            Rule::And => {
                let mut query = BoolQuery::new();
                for condition in per_condition {
                    query.extend(condition);
                }
                query
            }
            Rule::Or => {
                let branches: Vec<Value> = per_condition.iter().map(BoolQuery::to_json).collect();
                let mut query = BoolQuery::new();
                if !branches.is_empty() {
                    query.must.push(json!({
                        "bool": {
                            "should": branches,
                            "minimum_should_match": 1
                        }
                    }));
                }
                query
            }
        })
    }

    /// Builds and buckets the fragments of one condition.
    pub fn build_condition(&self, condition: &SearchCondition) -> CompileResult<BoolQuery> {
        let predicate_bucket = Bucket::for_operator(condition.operator);
        let mut query = BoolQuery::new();
        for fragment in operators::build_fragments(condition)? {
            let bucket = match fragment.role {
                Role::Guard => Bucket::Must,
                Role::Predicate => predicate_bucket,
            };
            query.push(bucket, fragment.clause);
        }
        Ok(query)
    }

    /// Builds the query for one filter column using its own rule.
    pub fn build_column(
        &self,
        column: &FilterColumn,
        fields: &ResolvedFields,
    ) -> CompileResult<BoolQuery> {
        let field = column.field_ref();
        let resolved = fields.require(field.column_name())?;
        let conditions = column
            .filters()
            .map(|item| SearchCondition::new(field.clone(), item, resolved))
            .collect::<CompileResult<Vec<_>>>()?;
        self.build(column.rule(), &conditions)
    }

    /// Builds the query for several filter columns; columns always combine with AND.
    pub fn build_columns(
        &self,
        columns: &[FilterColumn],
        fields: &ResolvedFields,
    ) -> CompileResult<BoolQuery> {
        let mut query = BoolQuery::new();
        for column in columns {
            query.extend(self.build_column(column, fields)?);
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::types::{ConditionValue, FieldRef, FilterItem, ResolvedField, ValueTypeKind};

    fn condition(name: &str, operator: OperatorKind, val_type: ValueTypeKind, value: Value) -> SearchCondition {
        let item = FilterItem::new(operator, value).unwrap();
        let resolved = ResolvedField::new(name, val_type, false);
        SearchCondition::new(FieldRef::parse(name), &item, &resolved).unwrap()
    }

    fn fields() -> ResolvedFields {
        [
            ResolvedField::new("status", ValueTypeKind::String, false),
            ResolvedField::new("version", ValueTypeKind::Integer, false),
            ResolvedField::new("42", ValueTypeKind::Integer, false),
            ResolvedField::new("43", ValueTypeKind::String, true),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_bucket_table() {
        assert_eq!(Bucket::for_operator(OperatorKind::NotEquals), Bucket::MustNot);
        assert_eq!(Bucket::for_operator(OperatorKind::IsEmpty), Bucket::MustNot);
        assert_eq!(Bucket::for_operator(OperatorKind::NotContains), Bucket::MustNot);
        assert_eq!(Bucket::for_operator(OperatorKind::IsNotAnyOf), Bucket::MustNot);
        assert_eq!(Bucket::for_operator(OperatorKind::IsNotEmpty), Bucket::Must);
        assert_eq!(Bucket::for_operator(OperatorKind::InPeriod), Bucket::Must);
    }

    #[test]
    fn test_and_concatenates_buckets() {
        let conditions = vec![
            condition("version", OperatorKind::More, ValueTypeKind::Integer, json!(1)),
            condition("version", OperatorKind::Less, ValueTypeKind::Integer, json!(9)),
            condition("status", OperatorKind::NotEquals, ValueTypeKind::String, json!("x")),
        ];
        let query = EsQueryBuilder::new().build(Rule::And, &conditions).unwrap();
        assert_eq!(query.must.len(), 2);
        assert_eq!(query.must_not, vec![json!({"match": {"status": "x"}})]);
    }

    #[test]
    fn test_and_omits_empty_bucket() {
        let conditions = vec![condition(
            "version",
            OperatorKind::More,
            ValueTypeKind::Integer,
            json!(1),
        )];
        let query = EsQueryBuilder::new().build(Rule::And, &conditions).unwrap();
        assert_eq!(
            query.to_json(),
            json!({"bool": {"must": [{"range": {"version": {"gt": 1}}}]}})
        );
    }

    #[test]
    fn test_or_wraps_each_condition() {
        let conditions = vec![
            condition("version", OperatorKind::More, ValueTypeKind::Integer, json!(5)),
            condition("status", OperatorKind::IsEmpty, ValueTypeKind::String, Value::Null),
        ];
        let query = EsQueryBuilder::new().build(Rule::Or, &conditions).unwrap();
        assert_eq!(
            query.to_json(),
            json!({
                "bool": {
                    "must": [{
                        "bool": {
                            "should": [
                                {"bool": {"must": [{"range": {"version": {"gt": 5}}}]}},
                                {"bool": {"must_not": [{"exists": {"field": "status"}}]}}
                            ],
                            "minimum_should_match": 1
                        }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_or_keeps_multi_fragment_condition_together() {
        let conditions = vec![
            condition("status", OperatorKind::Equals, ValueTypeKind::String, json!("a")),
            condition("status", OperatorKind::Equals, ValueTypeKind::String, json!("b")),
        ];
        let query = EsQueryBuilder::new().build(Rule::Or, &conditions).unwrap();
        let should = &query.must[0]["bool"]["should"];
        assert_eq!(should.as_array().unwrap().len(), 2);
        assert_eq!(
            should[0],
            json!({"bool": {"must": [
                {"exists": {"field": "status"}},
                {"match": {"status": "a"}}
            ]}})
        );
    }

    #[test]
    fn test_dynamic_not_any_of_split_across_buckets() {
        let conditions = vec![condition(
            "42",
            OperatorKind::IsNotAnyOf,
            ValueTypeKind::Integer,
            json!([1, 2]),
        )];
        let query = EsQueryBuilder::new().build(Rule::And, &conditions).unwrap();
        assert_eq!(query.must, vec![json!({"exists": {"field": "parameters.42"}})]);
        assert_eq!(
            query.must_not,
            vec![json!({"terms": {"parameters.42": [1, 2]}})]
        );
    }

    #[test]
    fn test_static_conditions_precede_dynamic() {
        let conditions = vec![
            condition("42", OperatorKind::More, ValueTypeKind::Integer, json!(1)),
            condition("version", OperatorKind::More, ValueTypeKind::Integer, json!(1)),
        ];
        let query = EsQueryBuilder::new().build(Rule::And, &conditions).unwrap();
        assert!(query.must[0].get("range").is_some());
        assert!(query.must[1].get("script").is_some());
    }

    #[test]
    fn test_build_column_unknown() {
        let column = FilterColumn::new(
            "99",
            Rule::And,
            vec![FilterItem::new(OperatorKind::Equals, json!(1)).unwrap()],
        )
        .unwrap();
        let err = EsQueryBuilder::new()
            .build_column(&column, &fields())
            .unwrap_err();
        assert!(matches!(err, CompileError::BadColumn { column } if column == "99"));
    }

    #[test]
    fn test_build_column_unsupported_operator() {
        let column = FilterColumn::new(
            "version",
            Rule::And,
            vec![FilterItem::new(OperatorKind::Contains, json!("1")).unwrap()],
        )
        .unwrap();
        let err = EsQueryBuilder::new()
            .build_column(&column, &fields())
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperator { .. }));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_columns_combine_with_and() {
        let or_column = FilterColumn::new(
            "status",
            Rule::Or,
            vec![
                FilterItem::new(OperatorKind::Equals, json!("a")).unwrap(),
                FilterItem::new(OperatorKind::Equals, json!("b")).unwrap(),
            ],
        )
        .unwrap();
        let and_column = FilterColumn::new(
            "version",
            Rule::And,
            vec![FilterItem::new(OperatorKind::IsNotEmpty, Value::Null).unwrap()],
        )
        .unwrap();

        let query = EsQueryBuilder::new()
            .build_columns(&[or_column, and_column], &fields())
            .unwrap();
        assert_eq!(query.must.len(), 2);
        assert!(query.must[0]["bool"]["should"].is_array());
        assert_eq!(query.must[1], json!({"exists": {"field": "version"}}));
        assert!(query.must_not.is_empty());
    }

    #[test]
    fn test_multiple_field_list_equals() {
        let item = FilterItem::new(OperatorKind::Equals, json!(["a", "b"])).unwrap();
        let resolved = ResolvedField::new("43", ValueTypeKind::String, true);
        let condition = SearchCondition::new(FieldRef::parse("43"), &item, &resolved).unwrap();
        assert_eq!(
            condition.value,
            ConditionValue::List(vec![json!("a"), json!("b")])
        );
        let query = EsQueryBuilder::new().build(Rule::And, &[condition]).unwrap();
        assert_eq!(query.must[1], json!({"terms": {"parameters.43": ["a", "b"]}}));
    }
}
