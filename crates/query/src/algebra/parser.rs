use crate::error::ExpressionError;

use super::{Comparison, LogicalKind, Node};

/// Lowers the algebra to a backend representation.
///
/// Implementors provide the per-operator lowering table. A hook returning
/// `None` marks the operator as unsupported by the backend, and [`parse`]
/// reports it as [`ExpressionError::UnsupportedOperator`].
///
/// [`parse`]: Parser::parse
pub trait Parser {
    /// Backend representation of one node.
    type Output;

    /// Backend name used in error messages.
    const BACKEND: &'static str;

    /// Lowers a comparison on `key`.
    fn comparison(&self, key: &str, comparison: &Comparison) -> Option<Self::Output>;

    /// Lowers a logical combination of already lowered members.
    fn logical(&self, kind: LogicalKind, members: Vec<Self::Output>) -> Option<Self::Output>;

    /// Walks the tree bottom-up.
    fn parse(&self, node: &Node) -> Result<Self::Output, ExpressionError> {
        let unsupported = || ExpressionError::UnsupportedOperator {
            operator: node.tag().as_str(),
            backend: Self::BACKEND,
        };

        match node {
            Node::Field(field) | Node::Compare(field) => self
                .comparison(field.key(), field.comparison())
                .ok_or_else(unsupported),
            Node::Logical(logical) => {
                let members = logical
                    .members()
                    .iter()
                    .map(|member| self.parse(member))
                    .collect::<Result<Vec<_>, _>>()?;
                self.logical(logical.kind(), members).ok_or_else(unsupported)
            }
        }
    }
}
