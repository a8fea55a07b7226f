//! Inventory Query
//!
//! This crate compiles user-supplied filter and sort descriptions into
//! Elasticsearch search bodies for the inventory search service.
//!
//! # Features
//!
//! - **Two field shapes**: typed static attributes at the document root and
//!   untyped dynamic parameters stored as keywords under `parameters.<id>`
//! - **Per-type operator registries**: string, numeric, date and boolean
//!   families, each with a static and a dynamic variant
//! - **Batched type resolution**: dynamic parameter types come from a
//!   [`TypeRegistry`] in chunked lookups
//! - **Scripted comparisons**: ordering and text patterns on dynamic
//!   parameters run as Painless scripts with user values passed as params
//! - **Query algebra**: a small backend-agnostic IR lowered through a
//!   [`Parser`](algebra::Parser)
//!
//! Enable the `elasticsearch` feature for a registry backed by a live index:
//!
//! ```toml
//! [dependencies]
//! inventory-query = { version = "0.1", features = ["elasticsearch"] }
//! ```
//!
//! # Architecture
//!
//! - [`types`] - Filter input, field classification and typed conditions
//! - [`schema`] - Static attribute schema
//! - [`registry`] - Type registry trait and in-memory implementation
//! - [`resolver`] - Batched column type resolution
//! - [`elasticsearch`] - Operator registries, query and sort assemblers
//! - [`algebra`] - Backend-agnostic query IR
//! - [`compiler`] - The end-to-end compile call
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use inventory_query::registry::{InMemoryRegistry, ParameterTypeRecord};
//! use inventory_query::types::{parse_filters, ValueTypeKind};
//! use inventory_query::FilterCompiler;
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let registry = InMemoryRegistry::new()
//!     .with_record(ParameterTypeRecord::new(42, ValueTypeKind::Integer, false));
//! let compiler = FilterCompiler::new(registry);
//!
//! let filters = parse_filters(json!([
//!     {"columnName": "42", "rule": "and", "filters": [
//!         {"operator": "isAnyOf", "value": [1, 2, 3]}
//!     ]}
//! ]))
//! .unwrap();
//!
//! let search = compiler.compile(&filters, &[]).await.unwrap();
//! assert_eq!(
//!     search.query,
//!     json!({"bool": {"must": [
//!         {"exists": {"field": "parameters.42"}},
//!         {"terms": {"parameters.42": [1, 2, 3]}}
//!     ]}})
//! );
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod algebra;
pub mod compiler;
pub mod elasticsearch;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod types;

pub use compiler::{CompiledSearch, FilterCompiler};
pub use error::{CompileError, CompileResult, ExpressionError, RegistryError};
pub use registry::{InMemoryRegistry, ParameterTypeRecord, TypeRegistry};
pub use resolver::{ResolverConfig, TypeResolver};
