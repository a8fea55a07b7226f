//! Lowers the backend-agnostic algebra to Elasticsearch Query DSL.

use serde_json::{Map, Value, json};

use crate::algebra::{Comparison, LogicalKind, Parser};

use super::clause::{self, RangeOp};

/// A lowered Elasticsearch operator.
#[derive(Debug, Clone, PartialEq)]
pub enum EsOperator {
    Term { field: String, value: Value },
    Terms { field: String, values: Vec<Value> },
    Range { field: String, op: RangeOp, value: Value },
    Bool(EsBool),
}

/// A `bool` compound query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EsBool {
    pub must: Vec<EsOperator>,
    pub should: Vec<EsOperator>,
    pub must_not: Vec<EsOperator>,
}

impl EsOperator {
    fn must_not(inner: EsOperator) -> Self {
        EsOperator::Bool(EsBool {
            must_not: vec![inner],
            ..EsBool::default()
        })
    }

    /// Serializes to Query DSL.
    pub fn to_json(&self) -> Value {
        match self {
            EsOperator::Term { field, value } => clause::term(field, value),
            EsOperator::Terms { field, values } => clause::terms(field, values),
            EsOperator::Range { field, op, value } => clause::range(field, *op, value),
            EsOperator::Bool(bool_query) => {
                let mut body = Map::new();
                let mut put = |key: &str, ops: &[EsOperator]| {
                    if !ops.is_empty() {
                        body.insert(
                            key.to_string(),
                            Value::Array(ops.iter().map(EsOperator::to_json).collect()),
                        );
                    }
                };
                put("must", &bool_query.must);
                put("should", &bool_query.should);
                put("must_not", &bool_query.must_not);
                if !bool_query.should.is_empty() {
                    body.insert("minimum_should_match".to_string(), json!(1));
                }
                json!({ "bool": body })
            }
        }
    }
}

/// Elasticsearch lowering table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EsParser;

impl Parser for EsParser {
    type Output = EsOperator;

    const BACKEND: &'static str = "elasticsearch";

    fn comparison(&self, key: &str, comparison: &Comparison) -> Option<EsOperator> {
        let field = key.to_string();
        let range = |op, value: &Value| EsOperator::Range {
            field: key.to_string(),
            op,
            value: value.clone(),
        };

        let op = match comparison {
            Comparison::Eq(value) => EsOperator::Term {
                field,
                value: value.clone(),
            },
            Comparison::In(values) => EsOperator::Terms {
                field,
                values: values.clone(),
            },
            Comparison::Gt(value) => range(RangeOp::Gt, value),
            Comparison::Gte(value) => range(RangeOp::Gte, value),
            Comparison::Lt(value) => range(RangeOp::Lt, value),
            Comparison::Lte(value) => range(RangeOp::Lte, value),
            Comparison::Ne(value) => EsOperator::must_not(EsOperator::Term {
                field,
                value: value.clone(),
            }),
            Comparison::Nin(values) => EsOperator::must_not(EsOperator::Terms {
                field,
                values: values.clone(),
            }),
        };
        Some(op)
    }

    fn logical(&self, kind: LogicalKind, members: Vec<EsOperator>) -> Option<EsOperator> {
        let mut bool_query = EsBool::default();
        match kind {
            LogicalKind::And => bool_query.must = members,
            LogicalKind::Or => bool_query.should = members,
            LogicalKind::Nor => bool_query.must_not = members,
        }
        Some(EsOperator::Bool(bool_query))
    }
}
