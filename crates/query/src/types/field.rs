//! Field references and resolved field types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

use super::value_type::ValueTypeKind;

/// Document object holding dynamic parameter values.
pub const PARAMETERS_PATH: &str = "parameters";

/// Physical shape of a field in the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Top-level document field with a schema-declared type.
    Static,
    /// Untyped value stored under [`PARAMETERS_PATH`].
    Dynamic,
}

/// A column reference, classified once from its name.
///
/// Decimal-digit names are dynamic parameter ids, everything else is a
/// static attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldRef {
    /// Static attribute by name.
    Attribute(String),
    /// Dynamic parameter by id.
    Parameter(String),
}

impl FieldRef {
    /// Classifies a column name.
    pub fn parse(name: &str) -> Self {
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            FieldRef::Parameter(name.to_string())
        } else {
            FieldRef::Attribute(name.to_string())
        }
    }

    /// Returns the raw column name (the key used in [`ResolvedFields`]).
    pub fn column_name(&self) -> &str {
        match self {
            FieldRef::Attribute(name) | FieldRef::Parameter(name) => name,
        }
    }

    /// Returns the physical shape.
    pub fn shape(&self) -> Shape {
        match self {
            FieldRef::Attribute(_) => Shape::Static,
            FieldRef::Parameter(_) => Shape::Dynamic,
        }
    }

    /// Returns the document path of the field.
    pub fn path(&self) -> String {
        match self {
            FieldRef::Attribute(name) => name.clone(),
            FieldRef::Parameter(id) => format!("{}.{}", PARAMETERS_PATH, id),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// The resolved type of one referenced column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    /// Raw column name.
    pub column_name: String,
    /// Declared value type.
    pub val_type: ValueTypeKind,
    /// Whether the field holds a list of values.
    pub multiple: bool,
    /// Whether the index can sort on the field directly.
    #[serde(default = "default_sortable")]
    pub sortable: bool,
}

fn default_sortable() -> bool {
    true
}

impl ResolvedField {
    /// Creates a sortable resolved field.
    pub fn new(column_name: impl Into<String>, val_type: ValueTypeKind, multiple: bool) -> Self {
        Self {
            column_name: column_name.into(),
            val_type,
            multiple,
            sortable: true,
        }
    }

    /// Marks whether the field can be sorted natively.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }
}

/// Resolved types keyed by raw column name.
///
/// Static attributes and dynamic parameters share this one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    fields: HashMap<String, ResolvedField>,
}

impl ResolvedFields {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolved field, replacing any earlier entry for the column.
    pub fn insert(&mut self, field: ResolvedField) {
        self.fields.insert(field.column_name.clone(), field);
    }

    /// Returns the entry for a column, if known.
    pub fn get(&self, column_name: &str) -> Option<&ResolvedField> {
        self.fields.get(column_name)
    }

    /// Returns the entry for a column or a [`CompileError::BadColumn`].
    pub fn require(&self, column_name: &str) -> CompileResult<&ResolvedField> {
        self.get(column_name).ok_or_else(|| CompileError::BadColumn {
            column: column_name.to_string(),
        })
    }

    /// Merges another map into this one.
    pub fn extend(&mut self, other: ResolvedFields) {
        self.fields.extend(other.fields);
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.values()
    }
}

impl FromIterator<ResolvedField> for ResolvedFields {
    fn from_iter<I: IntoIterator<Item = ResolvedField>>(iter: I) -> Self {
        let mut fields = ResolvedFields::new();
        for field in iter {
            fields.insert(field);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(FieldRef::parse("42"), FieldRef::Parameter("42".to_string()));
        assert_eq!(FieldRef::parse("name"), FieldRef::Attribute("name".to_string()));
        assert_eq!(FieldRef::parse("p42"), FieldRef::Attribute("p42".to_string()));
        assert_eq!(FieldRef::parse("").shape(), Shape::Static);
        // non-ASCII digits are not parameter ids
        assert_eq!(FieldRef::parse("٤٢").shape(), Shape::Static);
    }

    #[test]
    fn test_paths() {
        assert_eq!(FieldRef::parse("42").path(), "parameters.42");
        assert_eq!(FieldRef::parse("status").path(), "status");
    }

    #[test]
    fn test_require_unknown_column() {
        let fields: ResolvedFields =
            [ResolvedField::new("name", ValueTypeKind::String, false)].into_iter().collect();
        assert!(fields.require("name").is_ok());
        match fields.require("42") {
            Err(CompileError::BadColumn { column }) => assert_eq!(column, "42"),
            other => panic!("expected BadColumn, got {other:?}"),
        }
    }
}
