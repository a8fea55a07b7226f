//! Error types for the filter compiler.
//!
//! Every error here terminates a single compile call. Apart from
//! [`CompileError::Registry`], all of them describe bad caller input and map
//! to a client (4xx-equivalent) response.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use serde_json::Value;
use thiserror::Error;

use crate::types::{OperatorKind, ValueTypeKind};

/// The primary error type for compile operations.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The filter or sort input is malformed.
    #[error("invalid filter: {message}")]
    Validation { message: String },

    /// A referenced column has no resolvable type.
    #[error("unknown column: {column}")]
    BadColumn { column: String },

    /// No builder exists for this operator and value type.
    #[error("operator '{operator}' is not supported for value type '{val_type}'")]
    UnsupportedOperator {
        operator: OperatorKind,
        val_type: ValueTypeKind,
    },

    /// The supplied value cannot be converted to the column's declared type.
    #[error("cannot convert value {value} of column '{column}' to {expected}")]
    ValueCoercion {
        column: String,
        value: Value,
        expected: ValueTypeKind,
    },

    /// Query algebra errors.
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// Type registry errors.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CompileError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CompileError::Validation {
            message: message.into(),
        }
    }

    /// Returns true if the error was caused by the request rather than a backend fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, CompileError::Registry(_))
    }
}

/// Errors raised while building or lowering a query algebra expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// A logical operator was given no members.
    #[error("logical operator '{operator}' requires at least one member")]
    Empty { operator: &'static str },

    /// A logical operator mixes plain fields with operator nodes.
    #[error("logical operator '{operator}' mixes plain fields and operator nodes")]
    MixedShapes { operator: &'static str },

    /// Two sibling operator nodes share the same operator type.
    #[error("logical operator '{operator}' has more than one '{duplicate}' member")]
    DuplicateOperator {
        operator: &'static str,
        duplicate: &'static str,
    },

    /// The parser has no lowering for this operator type.
    #[error("operator '{operator}' is not supported by the {backend} parser")]
    UnsupportedOperator {
        operator: &'static str,
        backend: &'static str,
    },
}

/// Errors raised by type registry lookups.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry could not be reached or the request failed.
    #[error("type registry unavailable: {message}")]
    Unavailable { message: String },

    /// The registry answered with something that could not be decoded.
    #[error("invalid type registry response: {message}")]
    InvalidResponse { message: String },
}

/// Result type for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
