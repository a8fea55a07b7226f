//! Static attribute schema.
//!
//! Static attributes are top-level document fields whose types are fixed by
//! the storage schema. Each physical storage type maps to one search value
//! type; opaque physical types (geometry, raw JSON) are never searchable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ResolvedField, ValueTypeKind};

/// Storage-level type of a static attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalType {
    Integer,
    BigInteger,
    Float,
    Boolean,
    String,
    Text,
    Date,
    DateTime,
    Json,
    Geometry,
}

impl PhysicalType {
    /// Returns the search value type, or `None` for opaque types.
    pub fn search_type(self) -> Option<ValueTypeKind> {
        match self {
            PhysicalType::Integer | PhysicalType::BigInteger => Some(ValueTypeKind::Integer),
            PhysicalType::Float => Some(ValueTypeKind::Float),
            PhysicalType::Boolean => Some(ValueTypeKind::Boolean),
            PhysicalType::String | PhysicalType::Text => Some(ValueTypeKind::String),
            PhysicalType::Date => Some(ValueTypeKind::Date),
            PhysicalType::DateTime => Some(ValueTypeKind::Datetime),
            PhysicalType::Json | PhysicalType::Geometry => None,
        }
    }

    /// Returns false for analyzed full-text fields, which have no doc values.
    pub fn is_sortable(self) -> bool {
        !matches!(
            self,
            PhysicalType::Text | PhysicalType::Json | PhysicalType::Geometry
        )
    }
}

/// Table of static attributes and their physical types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSchema {
    attributes: HashMap<String, PhysicalType>,
}

impl StaticSchema {
    /// Creates an empty schema.
    pub fn empty() -> Self {
        Self {
            attributes: HashMap::new(),
        }
    }

    /// The attribute table of inventory objects.
    pub fn inventory_objects() -> Self {
        use PhysicalType::*;

        let attributes = [
            ("id", Integer),
            ("tmo_id", Integer),
            ("p_id", Integer),
            ("point_a_id", Integer),
            ("point_b_id", Integer),
            ("version", Integer),
            ("document_count", Integer),
            ("name", String),
            ("label", String),
            ("status", String),
            ("model", String),
            ("description", Text),
            ("active", Boolean),
            ("latitude", Float),
            ("longitude", Float),
            ("creation_date", DateTime),
            ("modification_date", DateTime),
            ("geometry", Geometry),
            ("pov", Json),
        ];

        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        }
    }

    /// Adds or replaces an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, physical: PhysicalType) -> Self {
        self.attributes.insert(name.into(), physical);
        self
    }

    /// Returns the physical type of an attribute.
    pub fn physical_type(&self, name: &str) -> Option<PhysicalType> {
        self.attributes.get(name).copied()
    }

    /// Resolves a searchable attribute. Static attributes are never multi-valued.
    pub fn resolve(&self, name: &str) -> Option<ResolvedField> {
        let physical = self.physical_type(name)?;
        let val_type = physical.search_type()?;
        Some(ResolvedField::new(name, val_type, false).with_sortable(physical.is_sortable()))
    }
}

impl Default for StaticSchema {
    fn default() -> Self {
        Self::inventory_objects()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_schema() {
        let schema = StaticSchema::default();
        let name = schema.resolve("name").unwrap();
        assert_eq!(name.val_type, ValueTypeKind::String);
        assert!(!name.multiple);
        assert_eq!(
            schema.resolve("creation_date").unwrap().val_type,
            ValueTypeKind::Datetime
        );
        assert_eq!(schema.resolve("active").unwrap().val_type, ValueTypeKind::Boolean);
    }

    #[test]
    fn test_text_attribute_not_sortable() {
        let schema = StaticSchema::default();
        let description = schema.resolve("description").unwrap();
        assert_eq!(description.val_type, ValueTypeKind::String);
        assert!(!description.sortable);
        assert!(schema.resolve("name").unwrap().sortable);
        assert!(!PhysicalType::Text.is_sortable());
    }

    #[test]
    fn test_opaque_types_not_searchable() {
        let schema = StaticSchema::default();
        assert_eq!(schema.physical_type("geometry"), Some(PhysicalType::Geometry));
        assert!(schema.resolve("geometry").is_none());
        assert!(schema.resolve("pov").is_none());
        assert!(schema.resolve("unknown").is_none());
    }

    #[test]
    fn test_custom_attribute() {
        let schema = StaticSchema::empty().with_attribute("serial", PhysicalType::Text);
        assert_eq!(schema.resolve("serial").unwrap().val_type, ValueTypeKind::String);
        assert!(schema.resolve("name").is_none());
    }
}
