//! Core types for the filter compiler.
//!
//! - [`FilterItem`], [`FilterColumn`], [`SortColumn`] - validated caller input
//! - [`FieldRef`], [`ResolvedField`], [`ResolvedFields`] - field classification and types
//! - [`SearchCondition`] - a typed condition ready for fragment building
//! - [`ValueTypeKind`] - the closed set of column value types
//!
//! # Examples
//!
//! ```
//! use inventory_query::types::{FilterColumn, FilterItem, OperatorKind, Rule, FieldRef};
//! use serde_json::json;
//!
//! let column = FilterColumn::new(
//!     "42",
//!     Rule::And,
//!     vec![FilterItem::new(OperatorKind::IsAnyOf, json!([1, 2, 3])).unwrap()],
//! )
//! .unwrap();
//!
//! assert_eq!(column.field_ref(), FieldRef::Parameter("42".to_string()));
//! assert_eq!(column.field_ref().path(), "parameters.42");
//! ```

mod condition;
mod field;
mod filter;
mod value_type;

pub use condition::{ConditionValue, SearchCondition};
pub use field::{FieldRef, PARAMETERS_PATH, ResolvedField, ResolvedFields, Shape};
pub use filter::{
    FilterColumn, FilterItem, OperatorKind, Rule, SortColumn, parse_filters, parse_sort,
};
pub use value_type::{INSTANT_FORMAT, OperatorFamily, ValueTypeKind};
