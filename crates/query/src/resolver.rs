//! Field type resolution.
//!
//! Resolves every referenced column to its declared value type and
//! multiplicity. Static attributes come from the [`StaticSchema`]; dynamic
//! parameters are fetched from a [`TypeRegistry`] in batched lookups.
//! Columns that resolve to nothing are left out of the result, and any
//! assembler that needs them fails with [`CompileError::BadColumn`].
//!
//! [`CompileError::BadColumn`]: crate::error::CompileError::BadColumn

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CompileResult;
use crate::registry::TypeRegistry;
use crate::schema::StaticSchema;
use crate::types::{FieldRef, ResolvedField, ResolvedFields};

/// Resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum number of ids sent in one registry lookup (default: 10000).
    #[serde(default = "default_lookup_batch_size")]
    pub lookup_batch_size: usize,
}

fn default_lookup_batch_size() -> usize {
    10_000
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup_batch_size: default_lookup_batch_size(),
        }
    }
}

/// Resolves column types against a static schema and a type registry.
#[derive(Debug, Clone)]
pub struct TypeResolver<R> {
    schema: StaticSchema,
    registry: R,
    config: ResolverConfig,
}

impl<R: TypeRegistry> TypeResolver<R> {
    /// Creates a resolver over the default inventory schema.
    pub fn new(registry: R) -> Self {
        Self {
            schema: StaticSchema::default(),
            registry,
            config: ResolverConfig::default(),
        }
    }

    /// Replaces the static schema.
    pub fn with_schema(mut self, schema: StaticSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the static schema.
    pub fn schema(&self) -> &StaticSchema {
        &self.schema
    }

    /// Returns the registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Resolves the distinct fields in `fields`.
    ///
    /// A failed registry lookup aborts the whole resolution; no partial map
    /// is returned.
    pub async fn resolve<'a>(
        &self,
        fields: impl IntoIterator<Item = &'a FieldRef>,
    ) -> CompileResult<ResolvedFields> {
        let distinct: BTreeSet<&FieldRef> = fields.into_iter().collect();

        let mut resolved = ResolvedFields::new();
        // id -> raw column names; "7" and "007" both look up id 7
        let mut parameters: BTreeMap<u64, Vec<&str>> = BTreeMap::new();

        for field in &distinct {
            match field {
                FieldRef::Attribute(name) => {
                    if let Some(entry) = self.schema.resolve(name) {
                        resolved.insert(entry);
                    }
                }
                FieldRef::Parameter(id) => match id.parse::<u64>() {
                    Ok(parsed) => parameters.entry(parsed).or_default().push(id),
                    Err(_) => tracing::warn!(column = %id, "parameter id out of range"),
                },
            }
        }

        if !parameters.is_empty() {
            let ids: Vec<u64> = parameters.keys().copied().collect();
            let batch_size = self.config.lookup_batch_size.max(1);

            for chunk in ids.chunks(batch_size) {
                tracing::debug!(ids = chunk.len(), "looking up parameter types");
                let records = self.registry.lookup(chunk).await?;

                for record in records {
                    let Some(names) = parameters.get(&record.id) else {
                        continue;
                    };
                    for name in names {
                        resolved.insert(ResolvedField::new(*name, record.val_type, record.multiple));
                    }
                }
            }
        }

        for field in &distinct {
            if resolved.get(field.column_name()).is_none() {
                tracing::warn!(column = %field, "column could not be resolved");
            }
        }

        tracing::debug!(
            requested = distinct.len(),
            resolved = resolved.len(),
            "resolved field types"
        );

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{CompileError, RegistryError};
    use crate::registry::{InMemoryRegistry, ParameterTypeRecord};
    use crate::types::ValueTypeKind;

    /// Records the size of every lookup it receives.
    #[derive(Default)]
    struct CountingRegistry {
        inner: InMemoryRegistry,
        calls: AtomicUsize,
        largest: AtomicUsize,
    }

    #[async_trait]
    impl TypeRegistry for CountingRegistry {
        async fn lookup(&self, ids: &[u64]) -> Result<Vec<ParameterTypeRecord>, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.largest.fetch_max(ids.len(), Ordering::SeqCst);
            self.inner.lookup(ids).await
        }
    }

    struct FailingRegistry;

    #[async_trait]
    impl TypeRegistry for FailingRegistry {
        async fn lookup(&self, _ids: &[u64]) -> Result<Vec<ParameterTypeRecord>, RegistryError> {
            Err(RegistryError::Unavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    fn refs(names: &[&str]) -> Vec<FieldRef> {
        names.iter().map(|n| FieldRef::parse(n)).collect()
    }

    #[tokio::test]
    async fn test_merges_static_and_dynamic() {
        let registry = InMemoryRegistry::new()
            .with_record(ParameterTypeRecord::new(42, ValueTypeKind::Integer, false))
            .with_record(ParameterTypeRecord::new(43, ValueTypeKind::String, true));
        let resolver = TypeResolver::new(registry);

        let fields = refs(&["name", "42", "43", "geometry", "44", "nope"]);
        let resolved = resolver.resolve(&fields).await.unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved.get("name").unwrap().val_type, ValueTypeKind::String);
        assert_eq!(resolved.get("42").unwrap().val_type, ValueTypeKind::Integer);
        assert!(resolved.get("43").unwrap().multiple);
        assert!(resolved.get("geometry").is_none());
        assert!(matches!(
            resolved.require("44"),
            Err(CompileError::BadColumn { .. })
        ));
    }

    #[tokio::test]
    async fn test_single_batched_lookup() {
        let registry = Arc::new(CountingRegistry::default());
        let resolver = TypeResolver::new(registry.clone());

        let fields = refs(&["1", "2", "3", "2", "name"]);
        resolver.resolve(&fields).await.unwrap();

        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.largest.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_lookup_without_parameters() {
        let registry = Arc::new(CountingRegistry::default());
        let resolver = TypeResolver::new(registry.clone());

        resolver.resolve(&refs(&["name", "status"])).await.unwrap();
        assert_eq!(registry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_is_chunked() {
        let inner: InMemoryRegistry = (1..=25)
            .map(|id| ParameterTypeRecord::new(id, ValueTypeKind::Float, false))
            .collect();
        let registry = Arc::new(CountingRegistry {
            inner,
            ..Default::default()
        });
        let resolver = TypeResolver::new(registry.clone())
            .with_config(ResolverConfig { lookup_batch_size: 10 });

        let names: Vec<String> = (1..=25).map(|id| id.to_string()).collect();
        let fields: Vec<FieldRef> = names.iter().map(|n| FieldRef::parse(n)).collect();
        let resolved = resolver.resolve(&fields).await.unwrap();

        assert_eq!(resolved.len(), 25);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 3);
        assert_eq!(registry.largest.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_leading_zero_ids_keep_raw_name() {
        let registry = InMemoryRegistry::new()
            .with_record(ParameterTypeRecord::new(7, ValueTypeKind::Boolean, false));
        let resolver = TypeResolver::new(registry);

        let resolved = resolver.resolve(&refs(&["007", "7"])).await.unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get("007").unwrap().val_type, ValueTypeKind::Boolean);
    }

    #[tokio::test]
    async fn test_registry_failure_aborts() {
        let resolver = TypeResolver::new(FailingRegistry);
        let err = resolver.resolve(&refs(&["name", "42"])).await.unwrap_err();
        assert!(matches!(err, CompileError::Registry(_)));
        assert!(!err.is_client_error());
    }
}
