//! Backend-agnostic query algebra.
//!
//! A small intermediate representation of field comparisons and logical
//! combinations, lowered to a concrete backend by a [`Parser`].
//!
//! [`FilterCompiler`](crate::FilterCompiler) does not go through this module;
//! the two paths share only the primitive clauses in
//! [`elasticsearch::clause`](crate::elasticsearch::clause).
//!
//! ```
//! use inventory_query::algebra::{Comparison, Logical, LogicalKind, Node};
//! use serde_json::json;
//!
//! let node = Logical::new(
//!     LogicalKind::And,
//!     vec![
//!         Node::compare("status", Comparison::Eq(json!("active"))),
//!         Node::compare("version", Comparison::Gte(json!(2))),
//!     ],
//! )
//! .unwrap();
//! assert!(matches!(node, Node::Logical(ref l) if l.members().len() == 2));
//! ```

mod parser;

pub use parser::Parser;

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::error::ExpressionError;

/// Operator type of a node, used for lowering tables and sibling checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorTag {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Ne,
    Nin,
    And,
    Or,
    Nor,
}

impl OperatorTag {
    /// Returns the operator name.
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorTag::Eq => "eq",
            OperatorTag::Gt => "gt",
            OperatorTag::Gte => "gte",
            OperatorTag::Lt => "lt",
            OperatorTag::Lte => "lte",
            OperatorTag::In => "in",
            OperatorTag::Ne => "ne",
            OperatorTag::Nin => "nin",
            OperatorTag::And => "and",
            OperatorTag::Or => "or",
            OperatorTag::Nor => "nor",
        }
    }
}

impl fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed comparison on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Eq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Ne(Value),
    Nin(Vec<Value>),
}

impl Comparison {
    /// Returns the operator type.
    pub fn tag(&self) -> OperatorTag {
        match self {
            Comparison::Eq(_) => OperatorTag::Eq,
            Comparison::Gt(_) => OperatorTag::Gt,
            Comparison::Gte(_) => OperatorTag::Gte,
            Comparison::Lt(_) => OperatorTag::Lt,
            Comparison::Lte(_) => OperatorTag::Lte,
            Comparison::In(_) => OperatorTag::In,
            Comparison::Ne(_) => OperatorTag::Ne,
            Comparison::Nin(_) => OperatorTag::Nin,
        }
    }
}

/// A bare value compares for equality.
impl From<Value> for Comparison {
    fn from(value: Value) -> Self {
        Comparison::Eq(value)
    }
}

/// A `{key: value_or_operator}` field reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: String,
    comparison: Comparison,
}

impl Field {
    /// Creates a field reference; plain values are wrapped as [`Comparison::Eq`].
    pub fn new(key: impl Into<String>, comparison: impl Into<Comparison>) -> Self {
        Self {
            key: key.into(),
            comparison: comparison.into(),
        }
    }

    /// Returns the field key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the comparison.
    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }
}

/// Logical combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKind {
    And,
    Or,
    Nor,
}

impl LogicalKind {
    /// Returns the operator type.
    pub fn tag(self) -> OperatorTag {
        match self {
            LogicalKind::And => OperatorTag::And,
            LogicalKind::Or => OperatorTag::Or,
            LogicalKind::Nor => OperatorTag::Nor,
        }
    }
}

/// A logical combination of members of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    kind: LogicalKind,
    members: Vec<Node>,
}

impl Logical {
    /// Creates a logical node.
    ///
    /// Members must be non-empty and all of one shape: either all plain
    /// fields, or all operator nodes. Operator-node members must have
    /// pairwise distinct operator types.
    pub fn new(kind: LogicalKind, members: Vec<Node>) -> Result<Node, ExpressionError> {
        let operator = kind.tag().as_str();
        let Some(first) = members.first() else {
            return Err(ExpressionError::Empty { operator });
        };

        let plain = first.is_plain();
        if members.iter().any(|m| m.is_plain() != plain) {
            return Err(ExpressionError::MixedShapes { operator });
        }

        if !plain {
            let mut seen = HashSet::new();
            for member in &members {
                let tag = member.tag();
                if !seen.insert(tag) {
                    return Err(ExpressionError::DuplicateOperator {
                        operator,
                        duplicate: tag.as_str(),
                    });
                }
            }
        }

        Ok(Node::Logical(Self { kind, members }))
    }

    /// Returns the combinator.
    pub fn kind(&self) -> LogicalKind {
        self.kind
    }

    /// Returns the members.
    pub fn members(&self) -> &[Node] {
        &self.members
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plain `{key: value_or_operator}` field reference.
    Field(Field),
    /// Typed comparison operator node.
    Compare(Field),
    /// Logical operator node.
    Logical(Logical),
}

impl Node {
    /// Creates a plain field node.
    pub fn field(key: impl Into<String>, value: impl Into<Comparison>) -> Self {
        Node::Field(Field::new(key, value))
    }

    /// Creates a comparison operator node.
    pub fn compare(key: impl Into<String>, comparison: Comparison) -> Self {
        Node::Compare(Field::new(key, comparison))
    }

    /// Returns true for plain field references.
    pub fn is_plain(&self) -> bool {
        matches!(self, Node::Field(_))
    }

    /// Returns the operator type of the node.
    pub fn tag(&self) -> OperatorTag {
        match self {
            Node::Field(field) | Node::Compare(field) => field.comparison.tag(),
            Node::Logical(logical) => logical.kind.tag(),
        }
    }
}
