//! Type registry for dynamic parameters.
//!
//! Dynamic parameters are declared by an upstream service; their value type
//! and multiplicity live in a registry the compiler queries by id. The
//! registry is the only I/O on the compile path.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::types::{ResolvedField, ValueTypeKind};

/// Declared type of one dynamic parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterTypeRecord {
    /// Parameter id.
    pub id: u64,
    /// Declared value type.
    pub val_type: ValueTypeKind,
    /// Whether the parameter holds a list of values.
    #[serde(default)]
    pub multiple: bool,
}

impl ParameterTypeRecord {
    /// Creates a record.
    pub fn new(id: u64, val_type: ValueTypeKind, multiple: bool) -> Self {
        Self {
            id,
            val_type,
            multiple,
        }
    }

    /// Converts the record into a resolved field keyed by the id string.
    pub fn into_resolved(self) -> ResolvedField {
        ResolvedField::new(self.id.to_string(), self.val_type, self.multiple)
    }
}

/// Looks up dynamic parameter types by id.
///
/// Implementations return one record per known id and silently omit
/// unknown ids. A failed lookup must return an error rather than a partial
/// result.
#[async_trait]
pub trait TypeRegistry: Send + Sync {
    /// Fetches the records for `ids` in one batched request.
    async fn lookup(&self, ids: &[u64]) -> Result<Vec<ParameterTypeRecord>, RegistryError>;
}

/// A registry snapshot held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    records: HashMap<u64, ParameterTypeRecord>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a record.
    pub fn with_record(mut self, record: ParameterTypeRecord) -> Self {
        self.records.insert(record.id, record);
        self
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the registry has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ParameterTypeRecord> for InMemoryRegistry {
    fn from_iter<I: IntoIterator<Item = ParameterTypeRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}

#[async_trait]
impl TypeRegistry for InMemoryRegistry {
    async fn lookup(&self, ids: &[u64]) -> Result<Vec<ParameterTypeRecord>, RegistryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl<R: TypeRegistry + ?Sized> TypeRegistry for std::sync::Arc<R> {
    async fn lookup(&self, ids: &[u64]) -> Result<Vec<ParameterTypeRecord>, RegistryError> {
        (**self).lookup(ids).await
    }
}
