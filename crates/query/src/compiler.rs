//! End-to-end filter compilation.
//!
//! [`FilterCompiler::compile`] resolves every referenced column, then hands
//! the snapshot to [`FilterCompiler::compile_resolved`], which builds the
//! query and sort without further I/O. One compile call owns its resolved
//! map; concurrent calls share nothing but the registry.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::elasticsearch::{EsQueryBuilder, EsSortBuilder};
use crate::error::CompileResult;
use crate::registry::TypeRegistry;
use crate::resolver::{ResolverConfig, TypeResolver};
use crate::schema::StaticSchema;
use crate::types::{FieldRef, FilterColumn, ResolvedFields, SortColumn};

/// A compiled search: query clause plus sort directives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSearch {
    /// The query clause.
    pub query: Value,
    /// Sort directives, primary first.
    pub sort: Vec<Value>,
}

impl CompiledSearch {
    /// Returns the search request body, omitting `sort` when empty.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.clone());
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), Value::Array(self.sort.clone()));
        }
        Value::Object(body)
    }

    /// Returns true if the query matches every document.
    pub fn is_match_all(&self) -> bool {
        self.query.get("match_all").is_some()
    }
}

/// Compiles filter and sort columns into an Elasticsearch search body.
#[derive(Debug, Clone)]
pub struct FilterCompiler<R> {
    resolver: TypeResolver<R>,
    query_builder: EsQueryBuilder,
    sort_builder: EsSortBuilder,
}

impl<R: TypeRegistry> FilterCompiler<R> {
    /// Creates a compiler over the default inventory schema.
    pub fn new(registry: R) -> Self {
        Self {
            resolver: TypeResolver::new(registry),
            query_builder: EsQueryBuilder::new(),
            sort_builder: EsSortBuilder::new(),
        }
    }

    /// Replaces the static schema.
    pub fn with_schema(mut self, schema: StaticSchema) -> Self {
        self.resolver = self.resolver.with_schema(schema);
        self
    }

    /// Replaces the resolver configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.resolver = self.resolver.with_config(config);
        self
    }

    /// Returns the type resolver.
    pub fn resolver(&self) -> &TypeResolver<R> {
        &self.resolver
    }

    /// Resolves the referenced columns and compiles the search.
    pub async fn compile(
        &self,
        filters: &[FilterColumn],
        sort: &[SortColumn],
    ) -> CompileResult<CompiledSearch> {
        let fields: Vec<FieldRef> = filters
            .iter()
            .map(FilterColumn::field_ref)
            .chain(sort.iter().map(SortColumn::field_ref))
            .collect();

        let resolved = self.resolver.resolve(&fields).await?;
        self.compile_resolved(&resolved, filters, sort)
    }

    /// Compiles against an already resolved field map.
    pub fn compile_resolved(
        &self,
        fields: &ResolvedFields,
        filters: &[FilterColumn],
        sort: &[SortColumn],
    ) -> CompileResult<CompiledSearch> {
        // every column must resolve before anything is built
        let columns = filters
            .iter()
            .map(FilterColumn::column_name)
            .chain(sort.iter().map(SortColumn::column_name));
        for column in columns {
            fields.require(column)?;
        }

        let query = if filters.is_empty() {
            json!({ "match_all": {} })
        } else {
            self.query_builder.build_columns(filters, fields)?.to_json()
        };
        let sort = self.sort_builder.build(sort, fields)?;

        tracing::debug!(
            filters = filters.len(),
            sort = sort.len(),
            query = %query,
            "compiled search"
        );

        Ok(CompiledSearch { query, sort })
    }
}

impl From<CompiledSearch> for Value {
    fn from(search: CompiledSearch) -> Self {
        search.to_body()
    }
}
